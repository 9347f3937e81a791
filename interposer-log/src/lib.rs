//! Transaction Log Stream Format
//!
//! This crate defines the byte stream the interposer appends to its EEPROM
//! log region every time the terminal resets the card, and the scanning
//! reader used to pull sessions back out of an EEPROM dump.
//!
//! # Stream Overview
//!
//! One flush produces one session:
//! ```text
//! ┌──────────┬────────┬───────────────────────────────────────┬──────────┐
//! │ APP MARK │ APP ID │ { CMD MARK, cmd, RSP MARK, rsp } × n  │ END MARK │
//! │ 5B       │ 1B     │ 5B + var + 5B + var per record        │ 5B       │
//! └──────────┴────────┴───────────────────────────────────────┴──────────┘
//! ```
//!
//! There is no length field. A reader finds the end of a payload by
//! scanning for the next marker, so a payload that itself contains five
//! consecutive copies of a marker byte will desynchronize it. The format
//! is kept as is because logs already written in the field use it.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod marker;
pub mod reader;
pub mod stream;

pub use marker::{Marker, MARKER_LEN};
pub use reader::{ReaderError, Record, Records, Session, SessionReader};
pub use stream::{record_len, EMPTY_SESSION_LEN, SESSION_HEADER_LEN, SESSION_TRAILER_LEN};
