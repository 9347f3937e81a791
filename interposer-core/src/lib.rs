//! Board-agnostic control core for the smart card interposer
//!
//! This crate contains all logic that survives the device's constant
//! reboots and does not depend on a specific microcontroller:
//!
//! - Persistent store of fixed-address EEPROM fields
//! - Bounded in-RAM transaction log and its EEPROM serializer
//! - Cold/warm reset classification
//! - Boot/dispatch/flush phase machine and the orchestrator driving it
//! - Application menu navigation
//! - Interrupt handler logic and the flush timing budget
//! - The forwarding application that produces the log
//! - Configuration type definitions

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod app;
pub mod apps;
pub mod config;
pub mod handlers;
pub mod link;
pub mod log;
pub mod menu;
pub mod orchestrator;
pub mod reset;
pub mod state;
pub mod store;
pub mod timing;

#[cfg(test)]
mod testing;

pub use app::{AppId, AppTable, StaticAppTable};
pub use apps::ForwardApp;
pub use config::{DeviceConfig, StoreLayout};
pub use link::{CardLink, LinkError, TerminalLink};
pub use log::{AppendError, Crp, FlushResult, LogBuffer, LogSink};
pub use menu::{MenuCursor, MenuItem};
pub use orchestrator::{BootAction, MenuChoice, Orchestrator, ResetReport};
pub use reset::ResetKind;
pub use store::{Field, PersistentStore};
