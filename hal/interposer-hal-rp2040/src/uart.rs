//! Blocking UART byte stream
//!
//! Exposes a blocking embassy-rp UART through `embedded-io`, which is what
//! the front-end link driver is written against.

use embassy_rp::uart::{Blocking, Error, Uart};
use embedded_io::{ErrorKind, ErrorType, Read, Write};

/// Blocking UART as an `embedded-io` stream
pub struct UartIo<'d> {
    uart: Uart<'d, Blocking>,
}

impl<'d> UartIo<'d> {
    pub fn new(uart: Uart<'d, Blocking>) -> Self {
        Self { uart }
    }
}

/// UART receive faults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UartError(pub ErrorKind);

impl From<Error> for UartError {
    fn from(error: Error) -> Self {
        match error {
            Error::Overrun => UartError(ErrorKind::OutOfMemory),
            Error::Break => UartError(ErrorKind::Interrupted),
            _ => UartError(ErrorKind::InvalidData),
        }
    }
}

impl embedded_io::Error for UartError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

impl ErrorType for UartIo<'_> {
    type Error = UartError;
}

impl Read for UartIo<'_> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        // Block for one byte; callers loop with read_exact
        self.uart.blocking_read(&mut buf[..1])?;
        Ok(1)
    }
}

impl Write for UartIo<'_> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.uart.blocking_write(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.uart.blocking_flush()?;
        Ok(())
    }
}
