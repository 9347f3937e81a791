//! Build script for interposer-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates board.toml and turns it into Rust constants

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn main() {
    setup_linker();
    let board = validate_config();
    write_constants(&board);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
}

/// Board parameters pulled out of board.toml
struct Board {
    i2c_address: i64,
    eeprom_size: i64,
    page_size: i64,
    write_cycle_us: i64,
    i2c_frequency_hz: i64,
    baudrate: i64,
    restart_timeout_ms: i64,
    flush_deadline_ms: i64,
    menu_timeout_ms: i64,
    clock_probe_samples: i64,
}

/// Longest countdown the RP2040 watchdog can hold
const WATCHDOG_MAX_MS: i64 = 8_300;

/// End of the log region; the EEPROM must reach at least this far
const LOG_REGION_END: i64 = 0xFE0;

fn fail(title: &str, errors: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Validate board.toml at compile time
fn validate_config() -> Board {
    println!("cargo:rerun-if-changed=board.toml");

    let config_path = Path::new("board.toml");
    if !config_path.exists() {
        fail(
            "board.toml not found",
            &["Create board.toml in the interposer-firmware directory".to_string()],
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read board.toml", &[e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail(
            "Invalid TOML syntax in board.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    };

    let mut errors = Vec::new();
    let mut get = |section: &str, key: &str| -> i64 {
        match config.get(section).and_then(|s| s.get(key)) {
            Some(toml::Value::Integer(value)) => *value,
            Some(_) => {
                errors.push(format!("[{}] '{}' must be an integer", section, key));
                0
            }
            None => {
                errors.push(format!("[{}] missing '{}'", section, key));
                0
            }
        }
    };

    let board = Board {
        i2c_address: get("eeprom", "i2c_address"),
        eeprom_size: get("eeprom", "size"),
        page_size: get("eeprom", "page_size"),
        write_cycle_us: get("eeprom", "write_cycle_us"),
        i2c_frequency_hz: get("eeprom", "i2c_frequency_hz"),
        baudrate: get("frontend", "baudrate"),
        restart_timeout_ms: get("timing", "restart_timeout_ms"),
        flush_deadline_ms: get("timing", "flush_deadline_ms"),
        menu_timeout_ms: get("timing", "menu_timeout_ms"),
        clock_probe_samples: get("timing", "clock_probe_samples"),
    };
    if !errors.is_empty() {
        fail("Missing or mistyped keys in board.toml", &errors);
    }

    validate_ranges(&board);

    println!("cargo:warning=board.toml validated successfully");
    board
}

fn validate_ranges(board: &Board) {
    let mut errors = Vec::new();

    if !(0x50..=0x57).contains(&board.i2c_address) {
        errors.push("[eeprom] i2c_address must be 0x50-0x57".to_string());
    }
    if board.eeprom_size < LOG_REGION_END || board.eeprom_size > 0x1_0000 {
        errors.push("[eeprom] size must be 4064-65536 bytes".to_string());
    }
    if board.page_size <= 0 || board.page_size > 64 || board.page_size & (board.page_size - 1) != 0
    {
        errors.push("[eeprom] page_size must be a power of two up to 64".to_string());
    }
    if !(1..=20_000).contains(&board.write_cycle_us) {
        errors.push("[eeprom] write_cycle_us must be 1-20000".to_string());
    }
    if !(100_000..=1_000_000).contains(&board.i2c_frequency_hz) {
        errors.push("[eeprom] i2c_frequency_hz must be 100000-1000000".to_string());
    }
    if !(9_600..=1_000_000).contains(&board.baudrate) {
        errors.push("[frontend] baudrate must be 9600-1000000".to_string());
    }
    if !(1..=WATCHDOG_MAX_MS).contains(&board.restart_timeout_ms) {
        errors.push(format!("[timing] restart_timeout_ms must be 1-{}", WATCHDOG_MAX_MS));
    }
    if !(1..=WATCHDOG_MAX_MS).contains(&board.flush_deadline_ms) {
        errors.push(format!("[timing] flush_deadline_ms must be 1-{}", WATCHDOG_MAX_MS));
    }
    if board.flush_deadline_ms <= board.restart_timeout_ms {
        errors.push("[timing] flush_deadline_ms must exceed restart_timeout_ms".to_string());
    }
    if board.menu_timeout_ms < 1_000 {
        errors.push("[timing] menu_timeout_ms must be at least 1000".to_string());
    }
    if !(2..=1_000).contains(&board.clock_probe_samples) {
        errors.push("[timing] clock_probe_samples must be 2-1000".to_string());
    }

    if !errors.is_empty() {
        fail("Invalid board configuration", &errors);
    }
}

/// Emit the validated values as constants for `board.rs`
fn write_constants(board: &Board) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let mut f = File::create(out_dir.join("board_config.rs")).unwrap();

    writeln!(f, "// Generated from board.toml by build.rs").unwrap();
    let constants = [
        ("EEPROM_I2C_ADDRESS", "u8", board.i2c_address),
        ("EEPROM_SIZE", "u16", board.eeprom_size.min(0xFFFF)),
        ("EEPROM_PAGE_SIZE", "u16", board.page_size),
        ("EEPROM_WRITE_CYCLE_US", "u32", board.write_cycle_us),
        ("I2C_FREQUENCY_HZ", "u32", board.i2c_frequency_hz),
        ("FRONTEND_BAUDRATE", "u32", board.baudrate),
        ("RESTART_TIMEOUT_MS", "u32", board.restart_timeout_ms),
        ("FLUSH_DEADLINE_MS", "u32", board.flush_deadline_ms),
        ("MENU_TIMEOUT_MS", "u64", board.menu_timeout_ms),
        ("CLOCK_PROBE_SAMPLES", "u32", board.clock_probe_samples),
    ];
    for (name, ty, value) in constants {
        writeln!(f, "pub const {}: {} = {};", name, ty, value).unwrap();
    }
}
