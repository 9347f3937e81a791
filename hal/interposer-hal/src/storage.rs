//! Non-volatile storage abstractions
//!
//! The interposer keeps every piece of state that must survive a reboot in a
//! small byte-addressable non-volatile memory (an EEPROM). There is no file
//! system and no wear levelling: fields live at fixed addresses and the
//! transaction log is appended to a fixed region.

/// Value of a cell that has been erased and never written
pub const ERASED_BYTE: u8 = 0xFF;

/// Errors from non-volatile storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Access falls outside the medium
    OutOfRange,
    /// Bus transfer failed (NAK, arbitration loss)
    Bus,
    /// Medium did not report write completion in time
    Timeout,
}

/// Byte-addressable non-volatile memory
///
/// Implementations must not return from [`NvStorage::write`] before the
/// medium has confirmed that the bytes are committed. The caller may arm a
/// watchdog reset immediately afterwards, and a write still in flight at
/// reset time is lost or torn.
pub trait NvStorage {
    /// Size of the medium in bytes
    fn capacity(&self) -> u16;

    /// Read `buf.len()` bytes starting at `address`
    fn read(&mut self, address: u16, buf: &mut [u8]) -> Result<(), StorageError>;

    /// Write `data` starting at `address`, blocking until committed
    fn write(&mut self, address: u16, data: &[u8]) -> Result<(), StorageError>;

    /// Read a single byte
    fn read_byte(&mut self, address: u16) -> Result<u8, StorageError> {
        let mut byte = [0u8; 1];
        self.read(address, &mut byte)?;
        Ok(byte[0])
    }

    /// Write a single byte, blocking until committed
    fn write_byte(&mut self, address: u16, value: u8) -> Result<(), StorageError> {
        self.write(address, &[value])
    }
}

/// Check that `len` bytes at `address` fit in a medium of `capacity` bytes
pub fn check_range(capacity: u16, address: u16, len: usize) -> Result<(), StorageError> {
    let end = address as usize + len;
    if end > capacity as usize {
        Err(StorageError::OutOfRange)
    } else {
        Ok(())
    }
}

/// RAM-backed storage
///
/// Behaves like a freshly erased EEPROM of `SIZE` bytes. Used for host-side
/// simulation of the boot/reset cycle and as the medium in tests; it can be
/// told to start failing after a number of writes to exercise fault paths.
#[derive(Debug, Clone)]
pub struct RamStorage<const SIZE: usize> {
    cells: [u8; SIZE],
    writes: usize,
    fail_after: Option<usize>,
}

impl<const SIZE: usize> Default for RamStorage<SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const SIZE: usize> RamStorage<SIZE> {
    /// Create an erased medium
    pub const fn new() -> Self {
        Self {
            cells: [ERASED_BYTE; SIZE],
            writes: 0,
            fail_after: None,
        }
    }

    /// Raw view of the whole medium
    pub fn as_bytes(&self) -> &[u8] {
        &self.cells
    }

    /// Number of completed write calls
    pub fn write_count(&self) -> usize {
        self.writes
    }

    /// Make every write after the next `writes` successful ones fail
    pub fn fail_after(&mut self, writes: usize) {
        self.fail_after = Some(self.writes + writes);
    }
}

impl<const SIZE: usize> NvStorage for RamStorage<SIZE> {
    fn capacity(&self) -> u16 {
        SIZE.min(u16::MAX as usize) as u16
    }

    fn read(&mut self, address: u16, buf: &mut [u8]) -> Result<(), StorageError> {
        check_range(self.capacity(), address, buf.len())?;
        let start = address as usize;
        buf.copy_from_slice(&self.cells[start..start + buf.len()]);
        Ok(())
    }

    fn write(&mut self, address: u16, data: &[u8]) -> Result<(), StorageError> {
        check_range(self.capacity(), address, data.len())?;
        if let Some(limit) = self.fail_after {
            if self.writes >= limit {
                return Err(StorageError::Bus);
            }
        }
        let start = address as usize;
        self.cells[start..start + data.len()].copy_from_slice(data);
        self.writes += 1;
        Ok(())
    }
}
