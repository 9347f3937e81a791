//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in interposer-hal and interposer-core for the interposer board:
//!
//! - EEPROM (AT24-series over I2C)
//! - Card power switching (GPIO)
//! - ISO7816 front-end links (length-prefixed UART)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod card;
pub mod eeprom;
pub mod frontend;
