//! Interposer - Smart Card Interposer Firmware
//!
//! Main firmware binary for RP2040-based interposer boards. Every boot runs
//! one cycle: load the persisted selection, relay terminal/card traffic
//! through the selected application, and on terminal reset flush the log
//! to EEPROM and let the watchdog restart the device.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::uart::{Config as UartConfig, Uart};
use embassy_time::Delay;
use {defmt_rtt as _, panic_probe as _};

use interposer_core::{BootAction, ForwardApp, Orchestrator};
use interposer_drivers::card::GpioCardPower;
use interposer_drivers::eeprom::At24;
use interposer_drivers::frontend::FrontendLink;
use interposer_hal::OutputPin;
use interposer_hal_rp2040::{RpInput, RpOutput, RpWatchdog, UartIo};

mod board;
mod context;
mod menu;
mod tasks;

/// Executor for the reset and presence handlers
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

fn frontend_config() -> UartConfig {
    let mut config = UartConfig::default();
    config.baudrate = board::FRONTEND_BAUDRATE;
    config
}

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Interposer firmware starting...");

    let p = embassy_rp::init(Default::default());

    // EEPROM on I2C0 (SDA=GPIO4, SCL=GPIO5)
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = board::I2C_FREQUENCY_HZ;
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c_config);
    let eeprom = At24::new(i2c, Delay, board::EEPROM);

    let watchdog = RpWatchdog::new(p.WATCHDOG);
    let mut orchestrator: context::Device = Orchestrator::new(eeprom, watchdog, board::DEVICE);

    let mut status_led = RpOutput::new(Output::new(p.PIN_25, Level::Low));
    let mut button = Input::new(p.PIN_15, Pull::Up);

    // Button held through power-on opens the menu
    let config_requested = button.is_low();

    match orchestrator.boot(config_requested) {
        BootAction::Menu => {
            info!("Configuration requested");
            let choice = menu::run(&mut button, &mut status_led, &board::APPS).await;
            info!("Menu choice: {}", choice);
            if let Err(e) = orchestrator.apply_menu(choice) {
                error!("Failed to apply menu choice: {}", e);
            }
            // Watchdog restarts the device
            core::future::pending::<()>().await;
        }
        BootAction::Dispatch => {}
    }

    let app = match orchestrator.dispatch(&board::APP_TABLE) {
        Ok(app) => app,
        Err(e) => {
            warn!("Failed to persist default application: {}", e);
            orchestrator.selected()
        }
    };
    info!(
        "Running application {} (transaction {})",
        app,
        orchestrator.tx_counter()
    );
    context::install(orchestrator);

    // Card contacts: RST=GPIO13, VCC enable=GPIO14 (active low)
    let card_detect = Input::new(p.PIN_12, Pull::Up);
    let card_led = RpOutput::new(Output::new(p.PIN_16, Level::Low));
    let mut card = GpioCardPower::new(
        RpOutput::new(Output::new(p.PIN_13, Level::Low)),
        RpOutput::new(Output::new(p.PIN_14, Level::High)),
        true,
    );
    if card_detect.is_low() {
        card.power_on();
    }

    // Terminal contacts: RST=GPIO10, CLK=GPIO11
    let terminal_reset = Input::new(p.PIN_10, Pull::None);
    let terminal_clock = RpInput::new(Input::new(p.PIN_11, Pull::None));

    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let spawner = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);
    unwrap!(spawner.spawn(tasks::terminal_reset_task(terminal_reset, terminal_clock)));
    unwrap!(spawner.spawn(tasks::card_presence_task(card_detect, card_led, card)));

    // Front-ends: terminal on UART0 (TX=GPIO0, RX=GPIO1), card on UART1
    // (TX=GPIO8, RX=GPIO9)
    let mut terminal = FrontendLink::new(UartIo::new(Uart::new_blocking(
        p.UART0,
        p.PIN_0,
        p.PIN_1,
        frontend_config(),
    )));
    let mut card_link = FrontendLink::new(UartIo::new(Uart::new_blocking(
        p.UART1,
        p.PIN_8,
        p.PIN_9,
        frontend_config(),
    )));

    status_led.set_high();

    let mut relay = ForwardApp::new(app != board::PASSTHROUGH);
    let error = relay.run(&mut terminal, &mut card_link, &mut context::SharedLog);
    warn!("Relay stopped: {}", error);

    // Terminal reset restarts the device
    core::future::pending::<()>().await;
}
