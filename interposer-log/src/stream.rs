//! Session layout
//!
//! Size arithmetic for sessions, shared by the on-device serializer (which
//! writes straight to EEPROM) and the worst-case flush budget.

use crate::marker::MARKER_LEN;

/// APP marker plus the application id byte
pub const SESSION_HEADER_LEN: usize = MARKER_LEN + 1;

/// END marker
pub const SESSION_TRAILER_LEN: usize = MARKER_LEN;

/// Smallest possible session: header and trailer with no records
pub const EMPTY_SESSION_LEN: usize = SESSION_HEADER_LEN + SESSION_TRAILER_LEN;

/// Encoded size of one command/response record
pub const fn record_len(command_len: usize, response_len: usize) -> usize {
    MARKER_LEN + command_len + MARKER_LEN + response_len
}
