//! Marker patterns delimiting log entries
//!
//! Every marker is five repetitions of a single byte. The byte values were
//! picked as unlikely runs inside APDU traffic; they are fixed by the logs
//! already in the field and must never change.

/// Length of every marker in bytes
pub const MARKER_LEN: usize = 5;

const APP_BYTE: u8 = 0xDD;
const COMMAND_BYTE: u8 = 0xCC;
const RESPONSE_BYTE: u8 = 0xAA;
const END_BYTE: u8 = 0xBB;

/// Kinds of marker in the log stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Marker {
    /// Start of a session, followed by the application id
    App,
    /// Start of a command payload
    Command,
    /// Start of a response payload
    Response,
    /// End of a session
    End,
}

impl Marker {
    /// The byte repeated to form this marker
    pub const fn byte(self) -> u8 {
        match self {
            Marker::App => APP_BYTE,
            Marker::Command => COMMAND_BYTE,
            Marker::Response => RESPONSE_BYTE,
            Marker::End => END_BYTE,
        }
    }

    /// The full five-byte pattern
    pub const fn pattern(self) -> [u8; MARKER_LEN] {
        [self.byte(); MARKER_LEN]
    }

    /// Look up the marker kind a repeated byte belongs to
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            APP_BYTE => Some(Marker::App),
            COMMAND_BYTE => Some(Marker::Command),
            RESPONSE_BYTE => Some(Marker::Response),
            END_BYTE => Some(Marker::End),
            _ => None,
        }
    }

    /// Check whether `bytes` starts with this marker
    pub fn is_at(self, bytes: &[u8]) -> bool {
        bytes.len() >= MARKER_LEN && bytes[..MARKER_LEN].iter().all(|&b| b == self.byte())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patterns_are_distinct() {
        let markers = [Marker::App, Marker::Command, Marker::Response, Marker::End];
        for (i, a) in markers.iter().enumerate() {
            for b in &markers[i + 1..] {
                assert_ne!(a.byte(), b.byte());
            }
        }
    }

    #[test]
    fn test_from_byte() {
        assert_eq!(Marker::from_byte(0xDD), Some(Marker::App));
        assert_eq!(Marker::from_byte(0xBB), Some(Marker::End));
        assert_eq!(Marker::from_byte(0x90), None);
    }

    #[test]
    fn test_is_at() {
        assert!(Marker::Command.is_at(&[0xCC, 0xCC, 0xCC, 0xCC, 0xCC, 0x00]));
        assert!(!Marker::Command.is_at(&[0xCC, 0xCC, 0xCC, 0xCC]));
        assert!(!Marker::Command.is_at(&[0xCC, 0xCC, 0xAA, 0xCC, 0xCC]));
    }
}
