//! Flush timing budget
//!
//! The terminal reset handler runs under a watchdog deadline. Every EEPROM
//! write blocks until the page write cycle completes, so the worst case is
//! a full log of maximum-size records written as separate page cycles.
//! The bound is computed at compile time and checked against the deadline.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use interposer_log::{record_len, EMPTY_SESSION_LEN};

use crate::config::{StoreLayout, FLUSH_DEADLINE_MS};
use crate::log::{LOG_CAPACITY, MAX_COMMAND_LEN, MAX_RESPONSE_LEN};

/// Device address and two address bytes sent with every page write
const WRITE_OVERHEAD_BYTES: u64 = 3;

/// Single-byte field writes in the handler: counter, cursor high and low,
/// warm reset flag
const FIELD_WRITES: u64 = 4;

/// EEPROM write characteristics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WriteTiming {
    /// Write page size in bytes
    pub page_size: u16,
    /// Worst-case internal write cycle per page
    pub page_write_us: u32,
    /// Bus time per transferred byte
    pub byte_transfer_us: u32,
}

impl WriteTiming {
    /// 24LC32A at 400 kHz: 32-byte pages, 5 ms write cycle, 9 clocks per
    /// byte
    pub const AT24C32: Self = Self {
        page_size: 32,
        page_write_us: 5_000,
        byte_transfer_us: 23,
    };
}

/// Worst-case duration of one terminal reset handler run in microseconds
///
/// Every log write may straddle a page boundary, so a session of `b` bytes
/// written in `k` calls costs at most `b / page + 1 + k` page cycles.
pub const fn worst_case_flush_us(
    capacity: usize,
    layout: &StoreLayout,
    timing: &WriteTiming,
) -> u64 {
    let session = EMPTY_SESSION_LEN + capacity * record_len(MAX_COMMAND_LEN, MAX_RESPONSE_LEN);
    let region = layout.log_len() as usize;
    let log_bytes = (if session < region { session } else { region }) as u64;

    // Header, END, and four writes per record
    let log_calls = 2 + 4 * capacity as u64;
    let log_pages = log_bytes / timing.page_size as u64 + 1 + log_calls;

    let pages = log_pages + FIELD_WRITES;
    let bytes = log_bytes + FIELD_WRITES + pages * WRITE_OVERHEAD_BYTES;

    pages * timing.page_write_us as u64 + bytes * timing.byte_transfer_us as u64
}

/// Check that the worst-case flush fits in `deadline_ms`
pub const fn fits_deadline(
    capacity: usize,
    layout: &StoreLayout,
    timing: &WriteTiming,
    deadline_ms: u32,
) -> bool {
    worst_case_flush_us(capacity, layout, timing) < deadline_ms as u64 * 1000
}

/// Worst case for the production configuration
pub const WORST_CASE_FLUSH_US: u64 =
    worst_case_flush_us(LOG_CAPACITY, &StoreLayout::DEFAULT, &WriteTiming::AT24C32);

const _: () = assert!(fits_deadline(
    LOG_CAPACITY,
    &StoreLayout::DEFAULT,
    &WriteTiming::AT24C32,
    FLUSH_DEADLINE_MS,
));
