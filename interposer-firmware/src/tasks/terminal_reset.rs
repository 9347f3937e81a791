//! Terminal reset task
//!
//! Waits for the terminal to pull the card reset line low, then runs the
//! reset handler: flush the log, classify the reset, arm the restart. The
//! task ends there and the watchdog takes the device back to boot.

use defmt::*;
use embassy_rp::gpio::Input;

use interposer_core::handlers::terminal_clock_present;
use interposer_core::log::FlushResult;
use interposer_hal_rp2040::RpInput;

use crate::board::CLOCK_PROBE_SAMPLES;
use crate::context;

#[embassy_executor::task]
pub async fn terminal_reset_task(mut reset: Input<'static>, clock: RpInput<'static>) {
    info!("Terminal reset task started");

    reset.wait_for_falling_edge().await;

    let clock_present = terminal_clock_present(&clock, CLOCK_PROBE_SAMPLES);
    let report = context::with_device(|device| device.on_terminal_reset(clock_present));

    let Some(Some(report)) = report else {
        warn!("Terminal reset outside a running session");
        return;
    };

    match report.flush {
        FlushResult::Empty => info!("Log empty, nothing flushed"),
        FlushResult::Written {
            records,
            dropped,
            start,
            cursor,
        } => {
            info!(
                "Flushed {} records at 0x{:04x}, cursor now 0x{:04x}",
                records, start, cursor
            );
            if dropped > 0 {
                warn!("{} records did not fit the log region", dropped);
            }
        }
        FlushResult::Exhausted { dropped } => {
            warn!("Log region full, {} records dropped", dropped)
        }
        FlushResult::Failed { error, dropped } => {
            error!("Log flush failed: {}, {} records lost", error, dropped)
        }
    }

    if let Err(e) = report.counter {
        error!("Failed to persist transaction counter: {}", e);
    }
    match report.reset {
        Ok(kind) => info!("{} reset, restarting", kind),
        Err(e) => error!("Reset classification failed: {}", e),
    }
}
