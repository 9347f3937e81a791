//! APDU links to the ISO7816 front-ends
//!
//! The terminal side and the card side are each handled by a front-end that
//! takes care of the byte-level protocol. The core only sees complete
//! command and response APDUs.

/// Errors from an APDU link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// APDU does not fit the buffer
    Overflow,
    /// Front-end reported no activity in time
    Timeout,
    /// Transport failure
    Io,
    /// Malformed frame from the front-end
    Framing,
}

/// Terminal-facing link: the interposer acts as the card
pub trait TerminalLink {
    /// Wait for the next command APDU; returns its length
    fn receive_command(&mut self, buf: &mut [u8]) -> Result<usize, LinkError>;

    /// Answer the last command
    fn send_response(&mut self, response: &[u8]) -> Result<(), LinkError>;
}

/// Card-facing link: the interposer acts as the terminal
pub trait CardLink {
    /// Send a command APDU and wait for the response; returns its length
    fn exchange(&mut self, command: &[u8], response: &mut [u8]) -> Result<usize, LinkError>;
}

impl<T: TerminalLink + ?Sized> TerminalLink for &mut T {
    fn receive_command(&mut self, buf: &mut [u8]) -> Result<usize, LinkError> {
        (**self).receive_command(buf)
    }

    fn send_response(&mut self, response: &[u8]) -> Result<(), LinkError> {
        (**self).send_response(response)
    }
}

impl<T: CardLink + ?Sized> CardLink for &mut T {
    fn exchange(&mut self, command: &[u8], response: &mut [u8]) -> Result<usize, LinkError> {
        (**self).exchange(command, response)
    }
}
