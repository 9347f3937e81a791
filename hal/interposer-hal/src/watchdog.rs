//! Watchdog abstraction
//!
//! The watchdog is the only way the device ever returns to boot: the
//! terminal-reset handler arms it as its deadline, and the boot sequence
//! arms it to restart after a configuration change. Once armed there is no
//! cancellation other than [`Watchdog::disarm`] at the next boot.

/// Countdown-to-reset timer
pub trait Watchdog {
    /// Arm (or re-arm) the countdown. The device resets `timeout_ms`
    /// milliseconds from now unless re-armed or disarmed first.
    fn arm(&mut self, timeout_ms: u32);

    /// Stop a running countdown
    fn disarm(&mut self);
}
