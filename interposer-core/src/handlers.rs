//! Interrupt handler bodies
//!
//! The terminal reset handler lives on [`crate::Orchestrator`] because it
//! needs the whole boot context. The card presence handler and the clock
//! probe only touch pins and are free functions.

use interposer_hal::{CardPower, InputPin, OutputPin};

/// Card presence edge
///
/// Mirrors presence on `indicator`. On removal, releases the card contacts.
pub fn on_card_presence(
    present: bool,
    indicator: &mut impl OutputPin,
    card: &mut impl CardPower,
) {
    indicator.set_state(present);
    if !present {
        card.deactivate();
    }
}

/// Check whether the terminal is still clocking the card
///
/// Samples the clock line `samples` times and reports a clock as soon as
/// the level changes. The probe has to span several clock periods: at the
/// 1 MHz minimum ISO7816 clock and a few cycles per sample, a couple of
/// dozen samples are plenty.
pub fn terminal_clock_present(clock: &impl InputPin, samples: u32) -> bool {
    let first = clock.is_high();
    (0..samples).any(|_| clock.is_high() != first)
}
