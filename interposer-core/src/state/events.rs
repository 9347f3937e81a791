//! Events that move the phase machine

/// Events that can trigger phase transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    // Boot events
    /// Configuration request detected at boot
    ConfigRequested,
    /// No configuration request at boot
    NoConfigRequest,

    // Menu events
    /// User chose to erase the store
    EraseChosen,
    /// User chose an application
    AppChosen,
    /// Menu closed without a choice
    NoSelection,

    // Run events
    /// Application to run has been decided
    AppResolved,

    // Reset handler events
    /// Terminal reset edge seen
    TerminalReset,
    /// Flush deadline watchdog armed
    DeadlineArmed,
    /// Log flushed and reset classified
    Flushed,
    /// Restart watchdog armed
    WatchdogArmed,
    /// Device came back up
    Rebooted,
}
