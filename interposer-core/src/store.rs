//! Persistent store
//!
//! Fixed-address fields and the log region on top of an [`NvStorage`]
//! medium. Every access is a single read or write of the medium; there is
//! no atomicity across fields, and a write returns only once the medium has
//! committed it.

use interposer_hal::storage::{StorageError, ERASED_BYTE};
use interposer_hal::NvStorage;

use crate::config::{StoreLayout, UNINITIALIZED_CURSOR};

/// Chunk size used when erasing the medium
const ERASE_CHUNK: usize = 32;

/// Single-byte persistent fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Field {
    /// Cold/warm reset toggle
    WarmResetFlag,
    /// Application to dispatch on the next boot
    SelectedApp,
    /// Completed transactions, modulo 256
    TxCounter,
}

/// EEPROM-backed fields and log region
#[derive(Debug)]
pub struct PersistentStore<S> {
    storage: S,
    layout: StoreLayout,
}

impl<S: NvStorage> PersistentStore<S> {
    /// Wrap a storage medium laid out as `layout`
    pub fn new(storage: S, layout: StoreLayout) -> Self {
        Self { storage, layout }
    }

    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    /// Underlying medium
    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Give back the underlying medium
    pub fn into_storage(self) -> S {
        self.storage
    }

    fn address(&self, field: Field) -> u16 {
        match field {
            Field::WarmResetFlag => self.layout.warm_reset_flag,
            Field::SelectedApp => self.layout.selected_app,
            Field::TxCounter => self.layout.tx_counter,
        }
    }

    pub fn read_field(&mut self, field: Field) -> Result<u8, StorageError> {
        let address = self.address(field);
        self.storage.read_byte(address)
    }

    pub fn write_field(&mut self, field: Field, value: u8) -> Result<(), StorageError> {
        let address = self.address(field);
        self.storage.write_byte(address, value)
    }

    /// Read the raw log cursor, high byte first
    pub fn read_cursor(&mut self) -> Result<u16, StorageError> {
        let hi = self.storage.read_byte(self.layout.log_cursor)?;
        let lo = self.storage.read_byte(self.layout.log_cursor + 1)?;
        Ok(u16::from_be_bytes([hi, lo]))
    }

    /// Write the log cursor, high byte first
    pub fn write_cursor(&mut self, cursor: u16) -> Result<(), StorageError> {
        let [hi, lo] = cursor.to_be_bytes();
        self.storage.write_byte(self.layout.log_cursor, hi)?;
        self.storage.write_byte(self.layout.log_cursor + 1, lo)
    }

    /// Next free log address
    ///
    /// An erased cursor, or one pointing below the log region, is reported
    /// as the start of the region. A cursor at or past the end of the region
    /// is returned as is; the region is full.
    pub fn log_cursor(&mut self) -> Result<u16, StorageError> {
        let cursor = self.read_cursor()?;
        if cursor == UNINITIALIZED_CURSOR || cursor < self.layout.log_start {
            Ok(self.layout.log_start)
        } else {
            Ok(cursor)
        }
    }

    fn check_log_range(&self, address: u16, len: usize) -> Result<(), StorageError> {
        let end = address as usize + len;
        if address < self.layout.log_start || end > self.layout.log_end as usize {
            Err(StorageError::OutOfRange)
        } else {
            Ok(())
        }
    }

    /// Write into the log region
    ///
    /// Refuses any write that would touch a byte outside
    /// `[log_start, log_end)`.
    pub fn write_log(&mut self, address: u16, bytes: &[u8]) -> Result<(), StorageError> {
        self.check_log_range(address, bytes.len())?;
        if bytes.is_empty() {
            return Ok(());
        }
        self.storage.write(address, bytes)
    }

    /// Read from the log region
    pub fn read_log(&mut self, address: u16, buf: &mut [u8]) -> Result<(), StorageError> {
        self.check_log_range(address, buf.len())?;
        self.storage.read(address, buf)
    }

    /// Fill the whole medium with the erased value
    pub fn erase(&mut self) -> Result<(), StorageError> {
        let blank = [ERASED_BYTE; ERASE_CHUNK];
        let capacity = self.storage.capacity() as usize;
        let mut address = 0;
        while address < capacity {
            let len = ERASE_CHUNK.min(capacity - address);
            self.storage.write(address as u16, &blank[..len])?;
            address += len;
        }
        Ok(())
    }

    /// Erase the medium and write factory values
    ///
    /// Warm reset flag, selected application and transaction counter are
    /// zeroed and the cursor points at the start of an empty log region.
    pub fn reset_defaults(&mut self) -> Result<(), StorageError> {
        self.erase()?;
        self.write_field(Field::WarmResetFlag, 0)?;
        self.write_field(Field::SelectedApp, 0)?;
        self.write_field(Field::TxCounter, 0)?;
        self.write_cursor(self.layout.log_start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interposer_hal::RamStorage;

    fn store() -> PersistentStore<RamStorage<4096>> {
        PersistentStore::new(RamStorage::new(), StoreLayout::DEFAULT)
    }

    #[test]
    fn test_fields_at_fixed_addresses() {
        let mut store = store();
        store.write_field(Field::WarmResetFlag, 0xAA).unwrap();
        store.write_field(Field::SelectedApp, 0x02).unwrap();
        store.write_field(Field::TxCounter, 7).unwrap();

        let bytes = store.storage().as_bytes();
        assert_eq!(bytes[0x000], 0xAA);
        assert_eq!(bytes[0x032], 0x02);
        assert_eq!(bytes[0x040], 7);

        assert_eq!(store.read_field(Field::SelectedApp), Ok(0x02));
        assert_eq!(store.read_field(Field::TxCounter), Ok(7));
    }

    #[test]
    fn test_cursor_is_big_endian() {
        let mut store = store();
        store.write_cursor(0x0123).unwrap();
        assert_eq!(&store.storage().as_bytes()[0x48..0x4A], &[0x01, 0x23]);
        assert_eq!(store.read_cursor(), Ok(0x0123));
    }

    #[test]
    fn test_erased_cursor_maps_to_region_start() {
        let mut store = store();
        assert_eq!(store.read_cursor(), Ok(UNINITIALIZED_CURSOR));
        assert_eq!(store.log_cursor(), Ok(0x80));
    }

    #[test]
    fn test_cursor_below_region_maps_to_region_start() {
        let mut store = store();
        store.write_cursor(0x0010).unwrap();
        assert_eq!(store.log_cursor(), Ok(0x80));

        store.write_cursor(0x0FE0).unwrap();
        assert_eq!(store.log_cursor(), Ok(0x0FE0));
    }

    #[test]
    fn test_log_writes_confined_to_region() {
        let mut store = store();
        assert_eq!(store.write_log(0x7F, &[1, 2]), Err(StorageError::OutOfRange));
        assert_eq!(store.write_log(0xFDF, &[1, 2]), Err(StorageError::OutOfRange));
        assert_eq!(store.write_log(0xFDE, &[1, 2]), Ok(()));
        assert_eq!(store.storage().as_bytes()[0xFE0], ERASED_BYTE);

        let mut buf = [0u8; 2];
        store.read_log(0xFDE, &mut buf).unwrap();
        assert_eq!(buf, [1, 2]);
    }

    #[test]
    fn test_reset_defaults() {
        let mut store = store();
        store.write_log(0x100, &[0x42; 16]).unwrap();
        store.write_field(Field::SelectedApp, 3).unwrap();

        store.reset_defaults().unwrap();

        assert_eq!(store.read_field(Field::WarmResetFlag), Ok(0));
        assert_eq!(store.read_field(Field::SelectedApp), Ok(0));
        assert_eq!(store.read_field(Field::TxCounter), Ok(0));
        assert_eq!(store.read_cursor(), Ok(0x80));
        assert!(store.storage().as_bytes()[0x80..].iter().all(|&b| b == ERASED_BYTE));
    }

    #[test]
    fn test_storage_fault_propagates() {
        let mut store = store();
        store.storage_mut().fail_after(1);
        // High byte lands, low byte fails
        assert_eq!(store.write_cursor(0x0100), Err(StorageError::Bus));
    }
}
