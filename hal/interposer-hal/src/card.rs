//! Card power switching
//!
//! The interposer powers the chip card from its own supply. When the card
//! is pulled out of the slot the contacts must be released before the card
//! is gone, so the presence interrupt calls straight into this trait.

/// Card supply and signal line control
pub trait CardPower {
    /// Run the deactivation sequence: reset low, clock stopped, I/O low,
    /// supply off.
    fn deactivate(&mut self);

    /// Check if the card supply is currently on
    fn is_powered(&self) -> bool;
}
