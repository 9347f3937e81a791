//! Shared device context
//!
//! The orchestrator is created in `main`, then moved into a
//! critical-section mutex before the interrupt tasks start. The foreground
//! application reaches the log through [`SharedLog`]; the terminal reset
//! task takes the whole context for the flush. Both go through the same
//! lock, so an append can never interleave with the drain.

use core::cell::RefCell;

use embassy_rp::i2c::{Blocking, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::Delay;

use interposer_core::log::{AppendError, LogSink};
use interposer_core::Orchestrator;
use interposer_drivers::eeprom::At24;
use interposer_hal_rp2040::RpWatchdog;

pub type Eeprom = At24<I2c<'static, I2C0, Blocking>, Delay>;

pub type Device = Orchestrator<Eeprom, RpWatchdog>;

static DEVICE: Mutex<CriticalSectionRawMutex, RefCell<Option<Device>>> =
    Mutex::new(RefCell::new(None));

/// Hand the orchestrator over to the shared context
pub fn install(device: Device) {
    DEVICE.lock(|cell| cell.replace(Some(device)));
}

/// Run `f` on the orchestrator with interrupts disabled
pub fn with_device<R>(f: impl FnOnce(&mut Device) -> R) -> Option<R> {
    DEVICE.lock(|cell| cell.borrow_mut().as_mut().map(f))
}

/// Log capability handed to the running application
pub struct SharedLog;

impl LogSink for SharedLog {
    fn record(&mut self, command: &[u8], response: &[u8]) -> Result<(), AppendError> {
        with_device(|device| device.record(command, response)).unwrap_or(Err(AppendError::Closed))
    }

    fn transaction_started(&mut self) {
        with_device(|device| device.transaction_started());
    }
}
