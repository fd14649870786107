//! Build script for bmlite-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates board.toml at compile time
//! - Emits the validated board as Rust constants into OUT_DIR

use std::collections::BTreeMap;
use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// GPIOs on the RP2040
const GPIO_COUNT: i64 = 30;

/// Highest SPI clock (clk_peri / 2)
const MAX_CLOCK_HZ: i64 = 62_500_000;

/// Largest single transfer the binding accepts
const MAX_TRANSFER_SIZE: i64 = 4096;

fn main() {
    setup_linker();
    let board = validate_config();
    emit_board_config(&board);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    // defmt's linker script only exists when the defmt feature pulls it in
    if env::var_os("CARGO_FEATURE_DEFMT").is_some() {
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Board values that survived validation
struct Board {
    values: BTreeMap<&'static str, i64>,
}

impl Board {
    fn get(&self, key: &str) -> i64 {
        self.values.get(key).copied().unwrap_or_default()
    }
}

/// Validate board.toml configuration at compile time
fn validate_config() -> Board {
    // Re-run if board.toml changes
    println!("cargo:rerun-if-changed=board.toml");

    let config_path = Path::new("board.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: board.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a board.toml describing how the sensor    ║\n\
            ║  is wired. Please create one in the bmlite-firmware directory.   ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read board.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in board.toml                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    let mut values = BTreeMap::new();

    let spi_keys = ["host", "clock_hz", "max_transfer_size", "sclk", "mosi", "miso"];
    let sensor_keys = [
        "cs",
        "reset",
        "ready",
        "timeout_ms",
        "reset_pulse_ms",
        "reset_settle_ms",
    ];
    read_section(&config, "spi", &spi_keys, &mut values, &mut errors);
    read_section(&config, "sensor", &sensor_keys, &mut values, &mut errors);
    report("Missing or malformed keys in board.toml", &errors);

    let board = Board { values };
    validate_spi(&board, &mut errors);
    validate_pins(&board, &mut errors);
    validate_timing(&board, &mut errors);
    report("Invalid board configuration", &errors);

    println!("cargo:warning=board.toml validated successfully");
    board
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Abort the build with every collected error
fn report(title: &str, errors: &[String]) {
    if errors.is_empty() {
        return;
    }
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

/// Read the required integer keys of a section
fn read_section(
    config: &toml::Value,
    section: &str,
    keys: &[&'static str],
    values: &mut BTreeMap<&'static str, i64>,
    errors: &mut Vec<String>,
) {
    let table = match config.get(section) {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push(format!("[{}] must be a table", section));
            return;
        }
        None => {
            errors.push(format!("Missing [{}] section", section));
            return;
        }
    };

    for key in keys {
        match table.get(*key) {
            Some(toml::Value::Integer(v)) if *v >= 0 => {
                values.insert(*key, *v);
            }
            Some(toml::Value::Integer(_)) => {
                errors.push(format!("[{}] {} must not be negative", section, key));
            }
            Some(_) => errors.push(format!("[{}] {} must be an integer", section, key)),
            None => errors.push(format!("[{}] missing '{}'", section, key)),
        }
    }
}

/// Validate bus clock and transfer size against the chip
fn validate_spi(board: &Board, errors: &mut Vec<String>) {
    if board.get("host") != 0 {
        errors.push("[spi] host must be 0 (only SPI0 is bound)".to_string());
    }

    let clock = board.get("clock_hz");
    if clock == 0 || clock > MAX_CLOCK_HZ {
        errors.push(format!("[spi] clock_hz must be 1-{}", MAX_CLOCK_HZ));
    }

    let size = board.get("max_transfer_size");
    if size == 0 || size > MAX_TRANSFER_SIZE {
        errors.push(format!(
            "[spi] max_transfer_size must be 1-{}",
            MAX_TRANSFER_SIZE
        ));
    }
}

/// Validate GPIO numbers and that no pin serves two roles
fn validate_pins(board: &Board, errors: &mut Vec<String>) {
    let pins = ["sclk", "mosi", "miso", "cs", "reset", "ready"];
    let mut seen: BTreeMap<i64, &str> = BTreeMap::new();

    for role in pins {
        let pin = board.get(role);
        if pin >= GPIO_COUNT {
            errors.push(format!("{} pin {} out of range (0-{})", role, pin, GPIO_COUNT - 1));
            continue;
        }
        if let Some(other) = seen.insert(pin, role) {
            errors.push(format!("GPIO {} assigned to both {} and {}", pin, other, role));
        }
    }
}

/// Validate sensor timing
fn validate_timing(board: &Board, errors: &mut Vec<String>) {
    let limit = i64::from(u32::MAX);
    for key in ["timeout_ms", "reset_pulse_ms", "reset_settle_ms"] {
        if board.get(key) > limit {
            errors.push(format!("[sensor] {} does not fit in 32 bits", key));
        }
    }
    if board.get("reset_pulse_ms") == 0 {
        errors.push("[sensor] reset_pulse_ms must be at least 1".to_string());
    }
}

/// Write the validated board as constants for `main`
fn emit_board_config(board: &Board) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let mut f = File::create(out_dir.join("board_config.rs")).unwrap();

    writeln!(f, "// Generated by build.rs from board.toml").unwrap();
    writeln!(
        f,
        "pub const BOARD: BoardConfig = BoardConfig {{\n    \
         spi_host: {},\n    \
         pins: PinAssignment {{\n        \
         reset: {},\n        ready: {},\n        cs: {},\n        \
         sclk: {},\n        mosi: {},\n        miso: {},\n    }},\n    \
         max_transfer_size: {},\n}};",
        board.get("host"),
        board.get("reset"),
        board.get("ready"),
        board.get("cs"),
        board.get("sclk"),
        board.get("mosi"),
        board.get("miso"),
        board.get("max_transfer_size"),
    )
    .unwrap();
    writeln!(f, "pub const SPI_CLOCK_HZ: u32 = {};", board.get("clock_hz")).unwrap();
    writeln!(f, "pub const RX_TIMEOUT_MS: u32 = {};", board.get("timeout_ms")).unwrap();
    writeln!(
        f,
        "pub const RESET_PULSE_MS: u32 = {};",
        board.get("reset_pulse_ms")
    )
    .unwrap();
    writeln!(
        f,
        "pub const RESET_SETTLE_MS: u32 = {};",
        board.get("reset_settle_ms")
    )
    .unwrap();
}
