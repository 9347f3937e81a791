//! AT24-series I2C EEPROM
//!
//! Serial EEPROMs of the AT24C32/24LC32A family: two address bytes, page
//! writes that wrap inside the page, and an internal write cycle during
//! which the device does not acknowledge its address.
//!
//! # Write Completion
//!
//! [`NvStorage::write`] must not return before the data is committed, so
//! every page write is followed by acknowledge polling: a one-byte read is
//! retried until the device answers again or the attempt budget runs out.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use heapless::Vec;

use interposer_hal::storage::{check_range, StorageError};
use interposer_hal::NvStorage;

/// Largest page size the driver handles in one bus transfer
pub const MAX_PAGE_SIZE: usize = 64;

/// Device parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct At24Config {
    /// 7-bit bus address (0x50-0x57)
    pub address: u8,
    /// Size in bytes
    pub capacity: u16,
    /// Write page size in bytes
    pub page_size: u16,
    /// Delay between acknowledge polls
    pub poll_interval_us: u32,
    /// Polls before a write is reported as timed out
    pub poll_attempts: u32,
}

impl At24Config {
    /// 32 Kbit part with A0-A2 tied low
    pub const AT24C32: Self = Self {
        address: 0x50,
        capacity: 4096,
        page_size: 32,
        poll_interval_us: 100,
        poll_attempts: 100,
    };
}

impl Default for At24Config {
    fn default() -> Self {
        Self::AT24C32
    }
}

/// AT24 EEPROM on a blocking I2C bus
pub struct At24<I2C, D> {
    i2c: I2C,
    delay: D,
    config: At24Config,
}

impl<I2C: I2c, D: DelayNs> At24<I2C, D> {
    pub fn new(i2c: I2C, delay: D, config: At24Config) -> Self {
        Self { i2c, delay, config }
    }

    pub fn config(&self) -> &At24Config {
        &self.config
    }

    /// Release the bus and delay provider
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    fn page_size(&self) -> usize {
        (self.config.page_size as usize).clamp(1, MAX_PAGE_SIZE)
    }

    /// Wait for the internal write cycle to finish
    fn wait_ready(&mut self) -> Result<(), StorageError> {
        let mut probe = [0u8; 1];
        for _ in 0..self.config.poll_attempts {
            if self.i2c.read(self.config.address, &mut probe).is_ok() {
                return Ok(());
            }
            self.delay.delay_us(self.config.poll_interval_us);
        }
        Err(StorageError::Timeout)
    }

    fn write_page(&mut self, address: u16, data: &[u8]) -> Result<(), StorageError> {
        let mut frame: Vec<u8, { MAX_PAGE_SIZE + 2 }> = Vec::new();
        frame
            .extend_from_slice(&address.to_be_bytes())
            .map_err(|_| StorageError::OutOfRange)?;
        frame
            .extend_from_slice(data)
            .map_err(|_| StorageError::OutOfRange)?;

        self.i2c
            .write(self.config.address, &frame)
            .map_err(|_| StorageError::Bus)?;
        self.wait_ready()
    }
}

impl<I2C: I2c, D: DelayNs> NvStorage for At24<I2C, D> {
    fn capacity(&self) -> u16 {
        self.config.capacity
    }

    fn read(&mut self, address: u16, buf: &mut [u8]) -> Result<(), StorageError> {
        check_range(self.config.capacity, address, buf.len())?;
        if buf.is_empty() {
            return Ok(());
        }
        self.i2c
            .write_read(self.config.address, &address.to_be_bytes(), buf)
            .map_err(|_| StorageError::Bus)
    }

    fn write(&mut self, address: u16, data: &[u8]) -> Result<(), StorageError> {
        check_range(self.config.capacity, address, data.len())?;

        let page = self.page_size();
        let mut address = address as usize;
        let mut rest = data;
        while !rest.is_empty() {
            // Never cross a page boundary in one transfer; the device
            // would wrap to the start of the page
            let room = page - address % page;
            let len = room.min(rest.len());
            let (chunk, tail) = rest.split_at(len);
            self.write_page(address as u16, chunk)?;
            address += len;
            rest = tail;
        }
        Ok(())
    }
}
