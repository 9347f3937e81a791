//! Application menu navigation
//!
//! The menu lists every application in the table followed by an erase
//! entry. The firmware moves the cursor with the button and confirms the
//! highlighted entry; rendering is left to the board.

use crate::app::AppId;
use crate::orchestrator::MenuChoice;

/// One menu line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuItem {
    App(AppId),
    Erase,
}

/// Cursor over the application entries plus erase
#[derive(Debug, Clone)]
pub struct MenuCursor<'a> {
    entries: &'a [AppId],
    index: usize,
}

impl<'a> MenuCursor<'a> {
    pub fn new(entries: &'a [AppId]) -> Self {
        Self { entries, index: 0 }
    }

    /// Number of lines, erase included
    pub fn len(&self) -> usize {
        self.entries.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Zero-based position of the highlighted line
    pub fn position(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> MenuItem {
        match self.entries.get(self.index) {
            Some(&id) => MenuItem::App(id),
            None => MenuItem::Erase,
        }
    }

    /// Move to the next line, wrapping after erase
    pub fn advance(&mut self) -> MenuItem {
        self.index = (self.index + 1) % self.len();
        self.current()
    }

    /// Confirm the highlighted line
    pub fn choose(&self) -> MenuChoice {
        match self.current() {
            MenuItem::App(id) => MenuChoice::App(id),
            MenuItem::Erase => MenuChoice::Erase,
        }
    }
}
