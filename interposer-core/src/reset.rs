//! Cold/warm reset classification
//!
//! A terminal typically resets the card twice in quick succession during
//! one transaction. The warm reset flag toggles on every terminal reset, so
//! resets alternate cold, warm, cold, warm. There is no time-based decay: a
//! flag left set by an interrupted cycle misclassifies the next reset once
//! and the sequence is back in step after that.

use interposer_hal::storage::StorageError;
use interposer_hal::NvStorage;

use crate::config::WARM_RESET_SENTINEL;
use crate::store::{Field, PersistentStore};

/// Kind of terminal reset just observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResetKind {
    /// First reset of a pair; a warm reset is now expected
    Cold,
    /// Second reset of a pair
    Warm,
}

/// Classify the reset and toggle the persisted flag
///
/// Any flag value other than the sentinel counts as unset, including the
/// erased `0xFF`.
pub fn classify<S: NvStorage>(store: &mut PersistentStore<S>) -> Result<ResetKind, StorageError> {
    if store.read_field(Field::WarmResetFlag)? == WARM_RESET_SENTINEL {
        store.write_field(Field::WarmResetFlag, 0)?;
        Ok(ResetKind::Warm)
    } else {
        store.write_field(Field::WarmResetFlag, WARM_RESET_SENTINEL)?;
        Ok(ResetKind::Cold)
    }
}

/// Clear the flag so that the next reset is cold
///
/// Used when the terminal dropped its clock: the card was powered down
/// rather than reset, and whatever comes next starts a fresh pair.
pub fn clear<S: NvStorage>(store: &mut PersistentStore<S>) -> Result<ResetKind, StorageError> {
    store.write_field(Field::WarmResetFlag, 0)?;
    Ok(ResetKind::Cold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreLayout;
    use interposer_hal::RamStorage;

    fn store() -> PersistentStore<RamStorage<4096>> {
        PersistentStore::new(RamStorage::new(), StoreLayout::DEFAULT)
    }

    #[test]
    fn test_toggle_from_erased() {
        let mut store = store();
        let kinds: Vec<_> = (0..4).map(|_| classify(&mut store).unwrap()).collect();
        assert_eq!(
            kinds,
            [ResetKind::Cold, ResetKind::Warm, ResetKind::Cold, ResetKind::Warm]
        );
        assert_eq!(store.read_field(Field::WarmResetFlag), Ok(0));
    }

    #[test]
    fn test_toggle_from_zero() {
        let mut store = store();
        store.write_field(Field::WarmResetFlag, 0).unwrap();
        assert_eq!(classify(&mut store), Ok(ResetKind::Cold));
        assert_eq!(store.read_field(Field::WarmResetFlag), Ok(WARM_RESET_SENTINEL));
        assert_eq!(classify(&mut store), Ok(ResetKind::Warm));
    }

    #[test]
    fn test_arbitrary_value_is_unset() {
        let mut store = store();
        store.write_field(Field::WarmResetFlag, 0x55).unwrap();
        assert_eq!(classify(&mut store), Ok(ResetKind::Cold));
    }

    #[test]
    fn test_clear() {
        let mut store = store();
        store.write_field(Field::WarmResetFlag, WARM_RESET_SENTINEL).unwrap();
        assert_eq!(clear(&mut store), Ok(ResetKind::Cold));
        assert_eq!(classify(&mut store), Ok(ResetKind::Cold));
    }

    #[test]
    fn test_fault_leaves_flag() {
        let mut store = store();
        store.storage_mut().fail_after(0);
        assert_eq!(classify(&mut store), Err(StorageError::Bus));
        assert_eq!(store.read_field(Field::WarmResetFlag), Ok(0xFF));
    }
}
