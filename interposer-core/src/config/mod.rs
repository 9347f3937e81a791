//! Configuration
//!
//! Compile-time device parameters: where every persistent field lives in
//! EEPROM, and the watchdog timeouts bounding the reset handler. The
//! production values are the [`Default`]s; host tests shrink the log region
//! to exercise the truncation paths.

pub mod layout;

pub use layout::{
    StoreLayout, EEPROM_SIZE, LOG_PAGE_SIZE, UNINITIALIZED_CURSOR, WARM_RESET_SENTINEL,
};

use crate::timing::WriteTiming;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Watchdog timeout used to restart the device after a flush or a
/// configuration change
pub const RESTART_TIMEOUT_MS: u32 = 15;

/// Watchdog timeout armed on entry to the terminal-reset handler
///
/// Must exceed the worst-case flush; see [`crate::timing`].
pub const FLUSH_DEADLINE_MS: u32 = 2000;

/// Device configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceConfig {
    /// EEPROM field addresses and log region
    pub layout: StoreLayout,
    /// Countdown armed to reboot the device
    pub restart_timeout_ms: u32,
    /// Countdown armed while the log is flushed
    pub flush_deadline_ms: u32,
    /// Write characteristics of the EEPROM
    pub write_timing: WriteTiming,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            layout: StoreLayout::DEFAULT,
            restart_timeout_ms: RESTART_TIMEOUT_MS,
            flush_deadline_ms: FLUSH_DEADLINE_MS,
            write_timing: WriteTiming::AT24C32,
        }
    }
}
