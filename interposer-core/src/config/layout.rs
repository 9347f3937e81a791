//! EEPROM layout
//!
//! Fixed addresses of the persistent fields and the log region. These must
//! stay stable across firmware versions: logs written by an older image are
//! read back with the same addresses, and a moved cursor field would make a
//! new image start logging over old sessions.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Size of the EEPROM in bytes
pub const EEPROM_SIZE: u16 = 4096;

/// Alignment of every flushed session
pub const LOG_PAGE_SIZE: u16 = 8;

/// `warm_reset_flag` value meaning "a warm reset is pending"
pub const WARM_RESET_SENTINEL: u8 = 0xAA;

/// Cursor value of an erased EEPROM
pub const UNINITIALIZED_CURSOR: u16 = 0xFFFF;

/// Addresses of the persistent fields and the log region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StoreLayout {
    /// Warm reset flag (1 byte)
    pub warm_reset_flag: u16,
    /// Selected application id (1 byte)
    pub selected_app: u16,
    /// Transaction counter (1 byte)
    pub tx_counter: u16,
    /// Log cursor, high byte first (2 bytes)
    pub log_cursor: u16,
    /// First byte of the log region
    pub log_start: u16,
    /// End of the log region (exclusive)
    pub log_end: u16,
    /// Session alignment, a power of two
    pub page_size: u16,
}

impl Default for StoreLayout {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl StoreLayout {
    /// Production layout
    pub const DEFAULT: Self = Self {
        warm_reset_flag: 0x000,
        selected_app: 0x032,
        tx_counter: 0x040,
        log_cursor: 0x048,
        log_start: 0x080,
        log_end: 0xFE0,
        page_size: LOG_PAGE_SIZE,
    };

    /// Production field addresses with a different log region
    pub const fn with_log_region(start: u16, end: u16) -> Self {
        Self {
            log_start: start,
            log_end: end,
            ..Self::DEFAULT
        }
    }

    /// Size of the log region in bytes
    pub const fn log_len(&self) -> u16 {
        self.log_end.saturating_sub(self.log_start)
    }

    /// Round `address` up to the next page boundary, never past `log_end`
    ///
    /// An address already on a boundary is returned unchanged rather than
    /// bumped to the following page.
    pub const fn align_up(&self, address: u16) -> u16 {
        let mask = self.page_size - 1;
        let aligned = match address.checked_add(mask) {
            Some(bumped) => bumped & !mask,
            None => self.log_end,
        };
        if aligned > self.log_end {
            self.log_end
        } else {
            aligned
        }
    }

    /// Check the layout against a medium of `capacity` bytes
    ///
    /// Fields must sit below the log region without overlapping each other,
    /// the region must be non-empty and fit the medium, and both region
    /// bounds must be page aligned.
    pub const fn is_valid(&self, capacity: u16) -> bool {
        let page_ok = self.page_size != 0 && self.page_size.is_power_of_two();
        if !page_ok {
            return false;
        }
        let mask = self.page_size - 1;
        let region_ok = self.log_start < self.log_end
            && self.log_end <= capacity
            && self.log_start & mask == 0
            && self.log_end & mask == 0;

        let fields = [
            self.warm_reset_flag,
            self.selected_app,
            self.tx_counter,
            self.log_cursor,
            self.log_cursor + 1,
        ];
        let mut i = 0;
        while i < fields.len() {
            if fields[i] >= self.log_start {
                return false;
            }
            let mut j = i + 1;
            while j < fields.len() {
                if fields[i] == fields[j] {
                    return false;
                }
                j += 1;
            }
            i += 1;
        }

        region_ok
    }
}

const _: () = assert!(StoreLayout::DEFAULT.is_valid(EEPROM_SIZE));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let layout = StoreLayout::DEFAULT;
        assert!(layout.is_valid(EEPROM_SIZE));
        assert_eq!(layout.log_len(), 0xF60);
    }

    #[test]
    fn test_align_up() {
        let layout = StoreLayout::DEFAULT;
        assert_eq!(layout.align_up(0x80), 0x80);
        assert_eq!(layout.align_up(0x81), 0x88);
        assert_eq!(layout.align_up(0xB1), 0xB8);
        // Carry into the high byte
        assert_eq!(layout.align_up(0x0FF9), 0x1000.min(layout.log_end));
        assert_eq!(layout.align_up(0x01F9), 0x0200);
    }

    #[test]
    fn test_align_up_clamps_to_region_end() {
        let layout = StoreLayout::with_log_region(0x80, 0xC0);
        assert_eq!(layout.align_up(0xBF), 0xC0);
        assert_eq!(layout.align_up(0xC0), 0xC0);
        assert_eq!(layout.align_up(0xFFFF), 0xC0);
    }

    #[test]
    fn test_invalid_layouts() {
        // Region overlaps the cursor field
        assert!(!StoreLayout::with_log_region(0x40, 0x100).is_valid(EEPROM_SIZE));
        // Region past the medium
        assert!(!StoreLayout::with_log_region(0x80, 0x1008).is_valid(EEPROM_SIZE));
        // Unaligned end
        assert!(!StoreLayout::with_log_region(0x80, 0x103).is_valid(EEPROM_SIZE));
        // Empty region
        assert!(!StoreLayout::with_log_region(0x80, 0x80).is_valid(EEPROM_SIZE));

        let mut overlapping = StoreLayout::DEFAULT;
        overlapping.tx_counter = overlapping.selected_app;
        assert!(!overlapping.is_valid(EEPROM_SIZE));
    }
}
