//! Hardware watchdog
//!
//! The RP2040 watchdog counts down from the loaded period and resets the
//! chip when it reaches zero. Nothing in the firmware ever feeds it: each
//! arm is a scheduled reboot.

use embassy_rp::peripherals::WATCHDOG;
use embassy_rp::watchdog::Watchdog as Inner;
use embassy_rp::Peri;
use embassy_time::Duration;
use interposer_hal::Watchdog;

/// RP2040 watchdog behind the `interposer-hal` trait
pub struct RpWatchdog {
    inner: Inner,
}

impl RpWatchdog {
    pub fn new(watchdog: Peri<'static, WATCHDOG>) -> Self {
        let mut inner = Inner::new(watchdog);
        // Keep counting under a debugger so resets behave as in the field
        inner.pause_on_debug(false);
        Self { inner }
    }
}

impl Watchdog for RpWatchdog {
    fn arm(&mut self, timeout_ms: u32) {
        self.inner.start(Duration::from_millis(timeout_ms as u64));
    }

    fn disarm(&mut self) {
        self.inner.stop();
    }
}
