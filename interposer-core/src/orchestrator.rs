//! Restart orchestrator
//!
//! Owns everything that lives from one boot to the next watchdog reset:
//! the persistent store, the watchdog, the in-RAM log, the selected
//! application and the transaction counter. Each boot walks the phase
//! machine from [`Phase::Boot`] to [`Phase::Restart`]; the firmware then
//! waits for the watchdog, and host tests call [`Orchestrator::restart`].

use interposer_hal::storage::{StorageError, ERASED_BYTE};
use interposer_hal::{NvStorage, Watchdog};

use crate::app::{AppId, AppTable};
use crate::config::DeviceConfig;
use crate::log::{self, AppendError, FlushResult, LogBuffer, LogSink, LOG_CAPACITY};
use crate::reset::{self, ResetKind};
use crate::state::{Event, Phase};
use crate::store::{Field, PersistentStore};

/// What the firmware should do after boot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootAction {
    /// Show the application menu
    Menu,
    /// Resolve and run the persisted application
    Dispatch,
}

/// Outcome of the application menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuChoice {
    /// Run this application from the next boot on
    App(AppId),
    /// Reset the store to factory values
    Erase,
    /// Leave the store as it is
    None,
}

/// Everything the terminal reset handler did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResetReport {
    /// Result of persisting the transaction counter
    pub counter: Result<(), StorageError>,
    /// Log flush outcome
    pub flush: FlushResult,
    /// Classification of this reset
    pub reset: Result<ResetKind, StorageError>,
}

/// Boot-to-restart controller
pub struct Orchestrator<S, W, const N: usize = LOG_CAPACITY> {
    store: PersistentStore<S>,
    watchdog: W,
    log: LogBuffer<N>,
    selected: AppId,
    tx_counter: u8,
    phase: Phase,
    config: DeviceConfig,
}

impl<S: NvStorage, W: Watchdog, const N: usize> Orchestrator<S, W, N> {
    /// Fresh context at power-on
    pub fn new(storage: S, watchdog: W, config: DeviceConfig) -> Self {
        Self {
            store: PersistentStore::new(storage, config.layout),
            watchdog,
            log: LogBuffer::new(),
            selected: AppId(ERASED_BYTE),
            tx_counter: 0,
            phase: Phase::Boot,
            config,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Application picked by the last boot or dispatch
    pub fn selected(&self) -> AppId {
        self.selected
    }

    pub fn tx_counter(&self) -> u8 {
        self.tx_counter
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn store(&self) -> &PersistentStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut PersistentStore<S> {
        &mut self.store
    }

    pub fn watchdog(&self) -> &W {
        &self.watchdog
    }

    /// Records waiting for the next flush
    pub fn log(&self) -> &LogBuffer<N> {
        &self.log
    }

    fn advance(&mut self, event: Event) {
        self.phase = self.phase.transition(event);
    }

    fn arm_restart(&mut self) {
        self.watchdog.arm(self.config.restart_timeout_ms);
        self.advance(Event::WatchdogArmed);
    }

    /// Start a boot cycle
    ///
    /// Disarms a watchdog left running by the previous cycle. Unless a
    /// configuration request is pending, loads the selected application
    /// and transaction counter; an unreadable field is treated as erased,
    /// and an erased counter starts from 0.
    pub fn boot(&mut self, config_requested: bool) -> BootAction {
        self.watchdog.disarm();

        if config_requested {
            self.advance(Event::ConfigRequested);
            return BootAction::Menu;
        }

        let store = &mut self.store;
        let (selected, counter) = critical_section::with(|_| {
            (
                store.read_field(Field::SelectedApp),
                store.read_field(Field::TxCounter),
            )
        });
        self.selected = AppId(selected.unwrap_or(ERASED_BYTE));
        self.tx_counter = match counter {
            Ok(ERASED_BYTE) | Err(_) => 0,
            Ok(count) => count,
        };

        self.advance(Event::NoConfigRequest);
        BootAction::Dispatch
    }

    /// Carry out the menu choice and arm an immediate restart
    ///
    /// The restart is armed even when the store write fails, so a failed
    /// choice just brings the menu back on the next configuration boot.
    pub fn apply_menu(&mut self, choice: MenuChoice) -> Result<(), StorageError> {
        let result = match choice {
            MenuChoice::Erase => {
                self.advance(Event::EraseChosen);
                self.store.reset_defaults()
            }
            MenuChoice::App(id) => {
                self.advance(Event::AppChosen);
                self.selected = id;
                self.store.write_field(Field::SelectedApp, id.0)
            }
            MenuChoice::None => {
                self.advance(Event::NoSelection);
                Ok(())
            }
        };
        self.arm_restart();
        result
    }

    /// Resolve the application to run and enter [`Phase::Running`]
    ///
    /// An id missing from `table` is replaced by the default application,
    /// which is persisted so the next boot runs it directly. The error case
    /// only reports that persisting failed; the default is still selected
    /// and the orchestrator is running.
    pub fn dispatch(&mut self, table: &impl AppTable) -> Result<AppId, StorageError> {
        let mut result = Ok(());
        if !table.contains(self.selected) {
            self.selected = table.default_app();
            result = self.store.write_field(Field::SelectedApp, self.selected.0);
        }
        self.advance(Event::AppResolved);
        result.map(|()| self.selected)
    }

    /// Terminal reset handler body
    ///
    /// Arms the flush deadline, persists the transaction counter, flushes
    /// the log, classifies the reset and arms the restart. With the terminal
    /// clock absent the warm reset flag is cleared instead of toggled.
    ///
    /// Runs once per boot: returns `None` unless the application is running.
    pub fn on_terminal_reset(&mut self, clock_present: bool) -> Option<ResetReport> {
        if !self.phase.accepts_records() {
            return None;
        }
        self.advance(Event::TerminalReset);

        self.watchdog.arm(self.config.flush_deadline_ms);
        self.advance(Event::DeadlineArmed);

        let counter = self.store.write_field(Field::TxCounter, self.tx_counter);
        let flush = log::flush(&mut self.store, &mut self.log, self.selected.0);
        let reset = if clock_present {
            reset::classify(&mut self.store)
        } else {
            reset::clear(&mut self.store)
        };
        self.advance(Event::Flushed);

        self.arm_restart();

        Some(ResetReport {
            counter,
            flush,
            reset,
        })
    }

    /// Reboot: everything but the store and the watchdog is lost
    pub fn restart(self) -> Self {
        let phase = self.phase.transition(Event::Rebooted);
        let mut next = Self::new(self.store.into_storage(), self.watchdog, self.config);
        next.phase = phase;
        next
    }
}

impl<S: NvStorage, W: Watchdog, const N: usize> LogSink for Orchestrator<S, W, N> {
    fn record(&mut self, command: &[u8], response: &[u8]) -> Result<(), AppendError> {
        if !self.phase.accepts_records() {
            return Err(AppendError::Closed);
        }
        self.log.append(command, response)
    }

    fn transaction_started(&mut self) {
        if self.phase.accepts_records() {
            self.tx_counter = self.tx_counter.wrapping_add(1);
        }
    }
}
