//! GPIO card power switch
//!
//! The card supply is switched through a load switch and the card reset
//! contact is driven directly. Clock and I/O belong to the card-side
//! front-end, which stops them on its own once reset goes low.

use interposer_hal::{CardPower, OutputPin};

/// Card supply and reset on two GPIO pins
pub struct GpioCardPower<RST, VCC> {
    reset: RST,
    supply: VCC,
    /// If true, supply ON = pin LOW (P-channel high-side switch)
    inverted: bool,
    powered: bool,
}

impl<RST: OutputPin, VCC: OutputPin> GpioCardPower<RST, VCC> {
    /// Create the switch with the card unpowered
    ///
    /// # Arguments
    /// - `reset`: card RST contact
    /// - `supply`: load switch enable
    /// - `inverted`: If true, the supply is on while `supply` is LOW
    pub fn new(reset: RST, supply: VCC, inverted: bool) -> Self {
        let mut power = Self {
            reset,
            supply,
            inverted,
            powered: true,
        };
        power.deactivate();
        power
    }

    fn drive_supply(&mut self, on: bool) {
        self.supply.set_state(on != self.inverted);
        self.powered = on;
    }

    /// Switch the supply on with reset held low
    ///
    /// The front-end releases reset after the clock has started.
    pub fn power_on(&mut self) {
        self.reset.set_low();
        self.drive_supply(true);
    }
}

impl<RST: OutputPin, VCC: OutputPin> CardPower for GpioCardPower<RST, VCC> {
    fn deactivate(&mut self) {
        // Reset first, supply last
        self.reset.set_low();
        self.drive_supply(false);
    }

    fn is_powered(&self) -> bool {
        self.powered
    }
}
