//! Transaction log
//!
//! Applications append command/response records to a bounded in-RAM
//! [`LogBuffer`] while they run; the terminal-reset handler drains it into
//! the EEPROM log region with [`serializer::flush`].

pub mod buffer;
pub mod serializer;

pub use buffer::{
    AppendError, Crp, Drain, LogBuffer, LOG_CAPACITY, MAX_COMMAND_LEN, MAX_RESPONSE_LEN,
};
pub use serializer::{flush, FlushResult};

/// Write access to the transaction log, handed to a running application
pub trait LogSink {
    /// Log one command/response exchange
    fn record(&mut self, command: &[u8], response: &[u8]) -> Result<(), AppendError>;

    /// Count one transaction, at the first command of a card session
    fn transaction_started(&mut self);
}

impl<T: LogSink + ?Sized> LogSink for &mut T {
    fn record(&mut self, command: &[u8], response: &[u8]) -> Result<(), AppendError> {
        (**self).record(command, response)
    }

    fn transaction_started(&mut self) {
        (**self).transaction_started()
    }
}
