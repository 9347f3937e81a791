//! RP2040-specific HAL for the interposer firmware
//!
//! This crate provides RP2040 implementations of the shared
//! `interposer-hal` traits on top of embassy-rp:
//!
//! - GPIO pins (`OutputPin`, `InputPin`)
//! - Hardware watchdog (`Watchdog`)
//! - Blocking UART as an `embedded-io` byte stream

#![no_std]

pub mod gpio;
pub mod uart;
pub mod watchdog;

pub use gpio::{RpInput, RpOutput};
pub use uart::UartIo;
pub use watchdog::RpWatchdog;
