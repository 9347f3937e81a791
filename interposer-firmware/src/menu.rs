//! Button menu
//!
//! Single-button navigation: a short press moves to the next entry, a long
//! press picks it. The status LED blinks the 1-based position of the
//! highlighted entry; the last position is erase. With no press for the
//! configured time the menu closes without a choice.

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_time::{with_timeout, Duration, Instant, Timer};

use interposer_core::{AppId, MenuChoice, MenuCursor};
use interposer_hal::OutputPin;
use interposer_hal_rp2040::RpOutput;

use crate::board::MENU_TIMEOUT_MS;

/// Hold time that turns a press into a confirmation
const LONG_PRESS: Duration = Duration::from_millis(800);

const BLINK: Duration = Duration::from_millis(150);

enum Press {
    Short,
    Long,
}

async fn press(button: &mut Input<'_>) -> Press {
    button.wait_for_low().await;
    let start = Instant::now();
    button.wait_for_high().await;
    // Debounce
    Timer::after_millis(20).await;
    if start.elapsed() >= LONG_PRESS {
        Press::Long
    } else {
        Press::Short
    }
}

async fn blink(led: &mut RpOutput<'_>, count: usize) {
    for _ in 0..count {
        led.set_high();
        Timer::after(BLINK).await;
        led.set_low();
        Timer::after(BLINK).await;
    }
}

/// Let the user pick an application or erase
pub async fn run(button: &mut Input<'_>, led: &mut RpOutput<'_>, entries: &[AppId]) -> MenuChoice {
    let mut cursor = MenuCursor::new(entries);

    // The button that requested the menu is still held
    button.wait_for_high().await;

    loop {
        debug!("Menu entry {}: {}", cursor.position() + 1, cursor.current());
        blink(led, cursor.position() + 1).await;

        match with_timeout(Duration::from_millis(MENU_TIMEOUT_MS), press(button)).await {
            Ok(Press::Short) => {
                cursor.advance();
            }
            Ok(Press::Long) => return cursor.choose(),
            Err(_) => {
                info!("Menu timed out");
                return MenuChoice::None;
            }
        }
    }
}
