//! Phase machine definition

use super::events::Event;

/// Boot-to-restart phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Power-on; watchdog disarmed, configuration request sampled
    Boot,
    /// Application menu shown
    Menu,
    /// Store being reset to factory values
    Erase,
    /// Chosen application being persisted
    PersistSelection,
    /// Selected application validated against the table
    Dispatch,
    /// Application running and logging
    Running,
    /// Terminal reset seen, flush deadline being armed
    ResetEdge,
    /// Log being written and the reset classified
    FlushAndClassify,
    /// Restart watchdog being armed
    ArmWatchdog,
    /// Waiting for the watchdog to reset the device
    Restart,
}

impl Phase {
    /// Check if an application may append to the log
    pub fn accepts_records(&self) -> bool {
        matches!(self, Phase::Running)
    }

    /// Process an event and return the next phase
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use Phase::*;

        match (self, event) {
            // Boot transitions
            (Boot, ConfigRequested) => Menu,
            (Boot, NoConfigRequest) => Dispatch,

            // Menu transitions
            (Menu, EraseChosen) => Erase,
            (Menu, AppChosen) => PersistSelection,
            (Menu, NoSelection) => Restart,
            (Erase, WatchdogArmed) => Restart,
            (PersistSelection, WatchdogArmed) => Restart,

            // Run transitions
            (Dispatch, AppResolved) => Running,
            (Running, TerminalReset) => ResetEdge,

            // Reset handler transitions
            (ResetEdge, DeadlineArmed) => FlushAndClassify,
            (FlushAndClassify, Flushed) => ArmWatchdog,
            (ArmWatchdog, WatchdogArmed) => Restart,

            // Reboot
            (_, Rebooted) => Boot,

            // Default: stay in current phase
            _ => self,
        }
    }
}
