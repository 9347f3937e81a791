//! Application identifiers and the application table

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of an interception application, as persisted in EEPROM
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AppId(pub u8);

impl From<u8> for AppId {
    fn from(id: u8) -> Self {
        AppId(id)
    }
}

impl From<AppId> for u8 {
    fn from(id: AppId) -> Self {
        id.0
    }
}

/// Applications the firmware was built with
pub trait AppTable {
    /// Applications offered in the menu, in menu order
    fn entries(&self) -> &[AppId];

    /// Application run when the persisted id is unknown
    fn default_app(&self) -> AppId;

    /// Check if `id` names a known application
    fn contains(&self, id: AppId) -> bool {
        self.entries().contains(&id)
    }
}

/// Application table over a static list of ids
#[derive(Debug, Clone, Copy)]
pub struct StaticAppTable<'a> {
    entries: &'a [AppId],
    default: AppId,
}

impl<'a> StaticAppTable<'a> {
    /// Build a table; `default` should be one of `entries`
    pub const fn new(entries: &'a [AppId], default: AppId) -> Self {
        Self { entries, default }
    }
}

impl AppTable for StaticAppTable<'_> {
    fn entries(&self) -> &[AppId] {
        self.entries
    }

    fn default_app(&self) -> AppId {
        self.default
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const APPS: [AppId; 2] = [AppId(1), AppId(2)];

    #[test]
    fn test_static_table() {
        let table = StaticAppTable::new(&APPS, AppId(2));
        assert!(table.contains(AppId(1)));
        assert!(!table.contains(AppId(0xFF)));
        assert_eq!(table.default_app(), AppId(2));
        assert_eq!(table.entries().len(), 2);
    }
}
