//! Board definition
//!
//! Pin assignment (RP2040):
//!
//! | Signal              | GPIO | Notes                              |
//! |---------------------|------|------------------------------------|
//! | Terminal front-end  | 0/1  | UART0 TX/RX                        |
//! | EEPROM SDA/SCL      | 4/5  | I2C0                               |
//! | Card front-end      | 8/9  | UART1 TX/RX                        |
//! | Terminal RST        | 10   | input, falling edge = reset        |
//! | Terminal CLK        | 11   | input, sampled for clock presence  |
//! | Card present switch | 12   | input, pull-up, low = card present |
//! | Card RST            | 13   | output                             |
//! | Card VCC enable     | 14   | output, active low                 |
//! | Menu button         | 15   | input, pull-up, low = pressed      |
//! | Card LED            | 16   | output                             |
//! | Status LED          | 25   | output                             |

use interposer_core::config::StoreLayout;
use interposer_core::log::LOG_CAPACITY;
use interposer_core::timing::{fits_deadline, WriteTiming};
use interposer_core::{AppId, DeviceConfig, StaticAppTable};
use interposer_drivers::eeprom::At24Config;

include!(concat!(env!("OUT_DIR"), "/board_config.rs"));

/// Relay without logging
pub const PASSTHROUGH: AppId = AppId(0x01);

/// Relay with logging
pub const FORWARD: AppId = AppId(0x02);

/// Menu order
pub const APPS: [AppId; 2] = [PASSTHROUGH, FORWARD];

/// Applications built into this firmware
pub const APP_TABLE: StaticAppTable<'static> = StaticAppTable::new(&APPS, FORWARD);

/// Delay between EEPROM acknowledge polls
const POLL_INTERVAL_US: u32 = 100;

pub const EEPROM: At24Config = At24Config {
    address: EEPROM_I2C_ADDRESS,
    capacity: EEPROM_SIZE,
    page_size: EEPROM_PAGE_SIZE,
    poll_interval_us: POLL_INTERVAL_US,
    // Twice the rated write cycle
    poll_attempts: 2 * EEPROM_WRITE_CYCLE_US / POLL_INTERVAL_US + 1,
};

pub const DEVICE: DeviceConfig = DeviceConfig {
    layout: StoreLayout::DEFAULT,
    restart_timeout_ms: RESTART_TIMEOUT_MS,
    flush_deadline_ms: FLUSH_DEADLINE_MS,
    write_timing: WriteTiming {
        page_size: EEPROM_PAGE_SIZE,
        // Worst case with ACK polling overshoot
        page_write_us: EEPROM_WRITE_CYCLE_US + POLL_INTERVAL_US,
        // 9 bus clocks per byte
        byte_transfer_us: 9_000_000 / I2C_FREQUENCY_HZ + 1,
    },
};

const _: () = assert!(DEVICE.layout.is_valid(EEPROM_SIZE));
const _: () = assert!(fits_deadline(
    LOG_CAPACITY,
    &DEVICE.layout,
    &DEVICE.write_timing,
    DEVICE.flush_deadline_ms,
));
