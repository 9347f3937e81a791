//! Interposer Hardware Abstraction Layer
//!
//! This crate defines the hardware seams of the interposer control core.
//! Chip-specific code (the RP2040 firmware) and concrete drivers implement
//! them; the core only ever sees these traits.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  interposer-firmware (board wiring)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  interposer-core (store, log, restart)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  interposer-hal (this crate - traits)   │
//! └─────────────────────────────────────────┘
//!                     ▲
//!                     │
//! ┌─────────────────────────────────────────┐
//! │  interposer-drivers (AT24, card power)  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`storage::NvStorage`] - Byte-addressable non-volatile memory
//! - [`watchdog::Watchdog`] - Countdown-to-reset timer
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O
//! - [`card::CardPower`] - Card supply and signal switching

#![no_std]
#![deny(unsafe_code)]

pub mod card;
pub mod gpio;
pub mod storage;
pub mod watchdog;

// Re-export key traits at crate root for convenience
pub use card::CardPower;
pub use gpio::{InputPin, OutputPin};
pub use storage::{NvStorage, RamStorage, StorageError};
pub use watchdog::Watchdog;
