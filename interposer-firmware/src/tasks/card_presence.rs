//! Card presence task
//!
//! Follows the card detect switch. Removal must release the contacts
//! before the card leaves the slot, so this runs at interrupt priority.

use defmt::*;
use embassy_rp::gpio::Input;

use interposer_core::handlers::on_card_presence;
use interposer_drivers::card::GpioCardPower;
use interposer_hal_rp2040::RpOutput;

pub type CardSwitch = GpioCardPower<RpOutput<'static>, RpOutput<'static>>;

#[embassy_executor::task]
pub async fn card_presence_task(
    mut detect: Input<'static>,
    mut led: RpOutput<'static>,
    mut card: CardSwitch,
) {
    info!("Card presence task started");

    loop {
        // Switch closes to ground with a card in the slot
        let present = detect.is_low();
        info!("Card present: {}", present);
        on_card_presence(present, &mut led, &mut card);

        detect.wait_for_any_edge().await;
    }
}
