//! Bounded record buffer

use heapless::{Deque, Vec};

use interposer_log::record_len;

/// Records held between two terminal resets
pub const LOG_CAPACITY: usize = 32;

/// Longest command kept: 5-byte header and 255 data bytes
pub const MAX_COMMAND_LEN: usize = 260;

/// Longest response kept: 256 data bytes and the status word
pub const MAX_RESPONSE_LEN: usize = 258;

/// Reasons an append is refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AppendError {
    /// Buffer already holds its capacity
    Full,
    /// Command exceeds [`MAX_COMMAND_LEN`]
    CommandTooLong,
    /// Response exceeds [`MAX_RESPONSE_LEN`]
    ResponseTooLong,
    /// Log already handed to the reset handler
    Closed,
}

/// One command/response record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crp {
    command: Vec<u8, MAX_COMMAND_LEN>,
    response: Vec<u8, MAX_RESPONSE_LEN>,
}

impl Crp {
    /// Copy a command and its response into a record
    pub fn new(command: &[u8], response: &[u8]) -> Result<Self, AppendError> {
        Ok(Self {
            command: Vec::from_slice(command).map_err(|_| AppendError::CommandTooLong)?,
            response: Vec::from_slice(response).map_err(|_| AppendError::ResponseTooLong)?,
        })
    }

    pub fn command(&self) -> &[u8] {
        &self.command
    }

    pub fn response(&self) -> &[u8] {
        &self.response
    }

    /// Bytes this record occupies in the log stream
    pub fn encoded_len(&self) -> usize {
        record_len(self.command.len(), self.response.len())
    }
}

/// Fixed-capacity, append-only record buffer
///
/// Never grows and never overwrites: once `N` records are held, further
/// appends are refused until the buffer is drained.
#[derive(Debug)]
pub struct LogBuffer<const N: usize = LOG_CAPACITY> {
    records: Deque<Crp, N>,
}

impl<const N: usize> Default for LogBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> LogBuffer<N> {
    pub const fn new() -> Self {
        Self {
            records: Deque::new(),
        }
    }

    /// Append a record at the end of the buffer
    pub fn append(&mut self, command: &[u8], response: &[u8]) -> Result<(), AppendError> {
        if self.records.is_full() {
            return Err(AppendError::Full);
        }
        let crp = Crp::new(command, response)?;
        self.records.push_back(crp).map_err(|_| AppendError::Full)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.records.is_full()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Records in append order
    pub fn iter(&self) -> impl Iterator<Item = &Crp> {
        self.records.iter()
    }

    /// Take the records out in append order
    ///
    /// The buffer is empty once the returned iterator is dropped, however
    /// many records were actually consumed.
    pub fn drain(&mut self) -> Drain<'_, N> {
        Drain {
            records: &mut self.records,
        }
    }
}

/// Draining iterator returned by [`LogBuffer::drain`]
pub struct Drain<'a, const N: usize> {
    records: &'a mut Deque<Crp, N>,
}

impl<const N: usize> Iterator for Drain<'_, N> {
    type Item = Crp;

    fn next(&mut self) -> Option<Crp> {
        self.records.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.records.len(), Some(self.records.len()))
    }
}

impl<const N: usize> Drop for Drain<'_, N> {
    fn drop(&mut self) {
        self.records.clear();
    }
}
