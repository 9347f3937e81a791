//! Length-prefixed UART link
//!
//! Each ISO7816 front-end is a small co-processor that runs the
//! character-level protocol and exchanges whole APDUs with the RP2040 over
//! a UART.
//!
//! # Frame Format
//!
//! ```text
//! ┌────────────┬───────────────────┐
//! │ LENGTH     │ APDU              │
//! │ 2B, BE     │ LENGTH bytes      │
//! └────────────┴───────────────────┘
//! ```
//!
//! A length of [`TIMEOUT_FRAME`] carries no payload and reports that the
//! far side went silent (terminal stopped clocking, card mute).

use embedded_io::{Read, Write};

use interposer_core::link::{CardLink, LinkError, TerminalLink};
use interposer_core::log::{MAX_COMMAND_LEN, MAX_RESPONSE_LEN};

/// Largest APDU carried in one frame
pub const MAX_FRAME_LEN: usize = if MAX_COMMAND_LEN > MAX_RESPONSE_LEN {
    MAX_COMMAND_LEN
} else {
    MAX_RESPONSE_LEN
};

/// Length value reporting a timeout on the far side
pub const TIMEOUT_FRAME: u16 = 0xFFFF;

/// APDU link to one front-end over a byte stream
pub struct FrontendLink<U> {
    uart: U,
}

impl<U: Read + Write> FrontendLink<U> {
    pub fn new(uart: U) -> Self {
        Self { uart }
    }

    pub fn release(self) -> U {
        self.uart
    }

    fn send_frame(&mut self, apdu: &[u8]) -> Result<(), LinkError> {
        if apdu.len() > MAX_FRAME_LEN {
            return Err(LinkError::Overflow);
        }
        let len = (apdu.len() as u16).to_be_bytes();
        self.uart.write_all(&len).map_err(|_| LinkError::Io)?;
        self.uart.write_all(apdu).map_err(|_| LinkError::Io)?;
        self.uart.flush().map_err(|_| LinkError::Io)
    }

    fn receive_frame(&mut self, buf: &mut [u8]) -> Result<usize, LinkError> {
        let mut len = [0u8; 2];
        self.uart.read_exact(&mut len).map_err(|_| LinkError::Io)?;
        let len = u16::from_be_bytes(len);
        if len == TIMEOUT_FRAME {
            return Err(LinkError::Timeout);
        }

        let len = len as usize;
        if len > MAX_FRAME_LEN {
            return Err(LinkError::Framing);
        }
        if len > buf.len() {
            // Drop the payload to stay in sync with the stream
            let mut sink = [0u8; 16];
            let mut left = len;
            while left > 0 {
                let n = left.min(sink.len());
                self.uart
                    .read_exact(&mut sink[..n])
                    .map_err(|_| LinkError::Io)?;
                left -= n;
            }
            return Err(LinkError::Overflow);
        }

        self.uart
            .read_exact(&mut buf[..len])
            .map_err(|_| LinkError::Io)?;
        Ok(len)
    }
}

impl<U: Read + Write> TerminalLink for FrontendLink<U> {
    fn receive_command(&mut self, buf: &mut [u8]) -> Result<usize, LinkError> {
        self.receive_frame(buf)
    }

    fn send_response(&mut self, response: &[u8]) -> Result<(), LinkError> {
        self.send_frame(response)
    }
}

impl<U: Read + Write> CardLink for FrontendLink<U> {
    fn exchange(&mut self, command: &[u8], response: &mut [u8]) -> Result<usize, LinkError> {
        self.send_frame(command)?;
        self.receive_frame(response)
    }
}
