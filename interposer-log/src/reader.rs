//! Scanning reader for EEPROM log dumps
//!
//! Walks a raw image of the log region and yields each session found in
//! it. Sessions are located by their APP marker, so erased padding between
//! page-aligned sessions is skipped naturally.
//!
//! A payload may end with a marker byte, which puts six or more copies of
//! that byte in a row just before the following marker. The reader treats
//! the *last* five bytes of such a run as the marker, which keeps those
//! payloads intact. A payload that contains a full five-byte run in its
//! middle still cuts the entry short; nothing in the format can tell the
//! two apart.

use crate::marker::{Marker, MARKER_LEN};
use crate::stream::SESSION_HEADER_LEN;

/// Errors found while scanning a log image
///
/// Offsets are byte positions within the scanned image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReaderError {
    /// APP marker at the very end of the image with no application id
    Truncated { offset: usize },
    /// Session never terminated by an END marker
    MissingEnd { offset: usize },
    /// Command without a following RSP marker
    MissingResponse { offset: usize },
    /// Bytes inside a session that do not start with a CMD marker
    UnexpectedData { offset: usize },
}

/// Find the next marker at or after `from`
///
/// With `settle` set, a run longer than the marker resolves to its last
/// five bytes.
fn find_marker(bytes: &[u8], from: usize, marker: Marker, settle: bool) -> Option<usize> {
    let byte = marker.byte();
    let mut run = 0;

    for i in from..bytes.len() {
        if bytes[i] != byte {
            run = 0;
            continue;
        }
        run += 1;
        if run == MARKER_LEN {
            if !settle {
                return Some(i + 1 - MARKER_LEN);
            }
            let mut end = i + 1;
            while end < bytes.len() && bytes[end] == byte {
                end += 1;
            }
            return Some(end - MARKER_LEN);
        }
    }

    None
}

/// One logged command/response exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    /// Command APDU bytes as sent by the terminal
    pub command: &'a [u8],
    /// Response APDU bytes as returned to the terminal
    pub response: &'a [u8],
}

/// One flushed session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session<'a> {
    /// Position of the APP marker within the image
    pub offset: usize,
    /// Application that was running when the session was logged
    pub app_id: u8,
    body: &'a [u8],
}

impl<'a> Session<'a> {
    /// Records of this session in logging order
    pub fn records(&self) -> Records<'a> {
        Records {
            body: self.body,
            base: self.offset + SESSION_HEADER_LEN,
            position: 0,
        }
    }

    /// Bytes between the application id and the END marker
    pub fn body(&self) -> &'a [u8] {
        self.body
    }
}

/// Iterator over the records of a session
#[derive(Debug, Clone)]
pub struct Records<'a> {
    body: &'a [u8],
    base: usize,
    position: usize,
}

impl<'a> Iterator for Records<'a> {
    type Item = Result<Record<'a>, ReaderError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.body.len() {
            return None;
        }

        let offset = self.base + self.position;
        if !Marker::Command.is_at(&self.body[self.position..]) {
            self.position = self.body.len();
            return Some(Err(ReaderError::UnexpectedData { offset }));
        }

        let command_start = self.position + MARKER_LEN;
        let Some(response_marker) = find_marker(self.body, command_start, Marker::Response, true)
        else {
            self.position = self.body.len();
            return Some(Err(ReaderError::MissingResponse { offset }));
        };

        let response_start = response_marker + MARKER_LEN;
        let next = find_marker(self.body, response_start, Marker::Command, true)
            .unwrap_or(self.body.len());

        self.position = next;
        Some(Ok(Record {
            command: &self.body[command_start..response_marker],
            response: &self.body[response_start..next],
        }))
    }
}

/// Iterator over the sessions of a log image
#[derive(Debug, Clone)]
pub struct SessionReader<'a> {
    image: &'a [u8],
    position: usize,
}

impl<'a> SessionReader<'a> {
    /// Scan `image`, typically the log region read out of EEPROM
    pub fn new(image: &'a [u8]) -> Self {
        Self { image, position: 0 }
    }

    fn stop(&mut self) {
        self.position = self.image.len();
    }
}

impl<'a> Iterator for SessionReader<'a> {
    type Item = Result<Session<'a>, ReaderError>;

    fn next(&mut self) -> Option<Self::Item> {
        let offset = find_marker(self.image, self.position, Marker::App, false)?;

        let header_end = offset + SESSION_HEADER_LEN;
        if header_end > self.image.len() {
            self.stop();
            return Some(Err(ReaderError::Truncated { offset }));
        }
        let app_id = self.image[offset + MARKER_LEN];

        let Some(end) = find_marker(self.image, header_end, Marker::End, true) else {
            self.stop();
            return Some(Err(ReaderError::MissingEnd { offset }));
        };

        self.position = end + MARKER_LEN;
        Some(Ok(Session {
            offset,
            app_id,
            body: &self.image[header_end..end],
        }))
    }
}
