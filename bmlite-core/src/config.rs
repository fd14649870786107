//! Board and session configuration
//!
//! These types describe how the sensor is wired and how the session is
//! brought up. They are built once at start-up and never change afterwards.

use bmlite_hal::spi::{BusConfig, DeviceConfig, DEFAULT_MAX_TRANSFER_SIZE};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Microseconds per millisecond, used for the receive timeout conversion
pub const MICROS_PER_MILLI: u32 = 1000;

/// Number of lines the sensor consumes (reset, ready, CS, SCLK, MOSI, MISO)
pub const LINE_COUNT: usize = 6;

/// Errors found while validating a board configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// GPIO number outside the chip's range
    InvalidPin { role: LineRole, pin: u8 },
    /// GPIO already claimed by an earlier role
    PinConflict { role: LineRole, pin: u8 },
    /// Requested clock exceeds the bus ceiling
    ClockTooFast,
    /// Max transfer size is zero or exceeds the DMA ceiling
    TransferSize,
}

/// Physical ceilings of a bus peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusLimits {
    /// Highest clock the peripheral can generate
    pub max_clock_hz: u32,
    /// Largest single DMA transfer in bytes
    pub max_transfer_size: usize,
    /// Number of GPIOs on the chip
    pub gpio_count: u8,
}

impl BusLimits {
    /// Check a device clock against the ceiling
    pub fn check_clock(&self, clock_hz: u32) -> Result<(), ConfigError> {
        if clock_hz == 0 || clock_hz > self.max_clock_hz {
            return Err(ConfigError::ClockTooFast);
        }
        Ok(())
    }

    /// Check a transfer size against the ceiling
    pub fn check_transfer_size(&self, size: usize) -> Result<(), ConfigError> {
        if size == 0 || size > self.max_transfer_size {
            return Err(ConfigError::TransferSize);
        }
        Ok(())
    }
}

/// Role of a line in the sensor wiring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineRole {
    Reset,
    Ready,
    ChipSelect,
    Clock,
    Mosi,
    Miso,
}

/// GPIO assignment for everything the sensor is wired to
///
/// The session owns every line listed here; nothing else may toggle them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinAssignment {
    /// Sensor reset (active-low)
    pub reset: u8,
    /// Sensor ready/IRQ (active-high)
    pub ready: u8,
    /// Chip-select (active-low, driven by the bus device)
    pub cs: u8,
    pub sclk: u8,
    pub mosi: u8,
    pub miso: u8,
}

impl PinAssignment {
    /// All lines paired with their role
    pub fn lines(&self) -> [(LineRole, u8); LINE_COUNT] {
        [
            (LineRole::Reset, self.reset),
            (LineRole::Ready, self.ready),
            (LineRole::ChipSelect, self.cs),
            (LineRole::Clock, self.sclk),
            (LineRole::Mosi, self.mosi),
            (LineRole::Miso, self.miso),
        ]
    }

    /// Check every line is on the chip and no line serves two roles
    pub fn validate(&self, gpio_count: u8) -> Result<(), ConfigError> {
        let mut alloc = LineAllocator::new(gpio_count);
        for (role, pin) in self.lines() {
            alloc.allocate(role, pin)?;
        }
        Ok(())
    }
}

/// Tracks which GPIOs have been claimed
#[derive(Debug, Clone, Copy)]
pub struct LineAllocator {
    /// Bitmask of claimed GPIOs (up to 64)
    allocated: u64,
    gpio_count: u8,
}

impl LineAllocator {
    /// Create an allocator for a chip with `gpio_count` GPIOs
    pub fn new(gpio_count: u8) -> Self {
        Self {
            allocated: 0,
            gpio_count: gpio_count.min(64),
        }
    }

    /// Claim a GPIO for `role`
    pub fn allocate(&mut self, role: LineRole, pin: u8) -> Result<(), ConfigError> {
        if pin >= self.gpio_count {
            return Err(ConfigError::InvalidPin { role, pin });
        }
        let mask = 1u64 << pin;
        if self.allocated & mask != 0 {
            return Err(ConfigError::PinConflict { role, pin });
        }
        self.allocated |= mask;
        Ok(())
    }

    /// Check if a GPIO is claimed
    pub fn is_allocated(&self, pin: u8) -> bool {
        if pin >= self.gpio_count {
            return false;
        }
        self.allocated & (1u64 << pin) != 0
    }
}

/// Board wiring for the sensor bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoardConfig {
    /// SPI peripheral instance
    pub spi_host: u8,
    pub pins: PinAssignment,
    /// Largest single transfer in bytes
    pub max_transfer_size: usize,
}

impl BoardConfig {
    /// Board config with the default transfer ceiling
    pub const fn new(spi_host: u8, pins: PinAssignment) -> Self {
        Self {
            spi_host,
            pins,
            max_transfer_size: DEFAULT_MAX_TRANSFER_SIZE,
        }
    }

    /// Validate wiring and sizes against the chip
    pub fn validate(&self, limits: &BusLimits) -> Result<(), ConfigError> {
        self.pins.validate(limits.gpio_count)?;
        limits.check_transfer_size(self.max_transfer_size)
    }

    /// Bus-level configuration derived from the wiring
    pub fn bus_config(&self) -> BusConfig {
        BusConfig {
            host: self.spi_host,
            sclk_pin: self.pins.sclk,
            mosi_pin: self.pins.mosi,
            miso_pin: self.pins.miso,
            max_transfer_size: self.max_transfer_size,
        }
    }

    /// Device configuration for the sensor at `clock_hz`
    pub fn device_config(&self, clock_hz: u32) -> DeviceConfig {
        DeviceConfig::new(clock_hz, self.pins.cs)
    }
}

/// Physical interface the protocol stack talks over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Interface {
    /// Serial line (not implemented on this board)
    Com,
    /// SPI bus
    #[default]
    Spi,
}

/// Parameters the caller hands to session initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InitParams {
    pub interface: Interface,
    /// Bus clock in Hz (SPI) or baud rate (serial)
    pub baudrate: u32,
    /// Receive timeout in milliseconds
    pub timeout_ms: u32,
}

impl InitParams {
    /// SPI parameters
    pub const fn spi(baudrate: u32, timeout_ms: u32) -> Self {
        Self {
            interface: Interface::Spi,
            baudrate,
            timeout_ms,
        }
    }

    /// Receive timeout in the microsecond unit the protocol layer uses
    pub fn timeout_us(&self) -> u32 {
        self.timeout_ms.saturating_mul(MICROS_PER_MILLI)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pins() -> PinAssignment {
        PinAssignment {
            reset: 20,
            ready: 21,
            cs: 17,
            sclk: 18,
            mosi: 19,
            miso: 16,
        }
    }

    fn limits() -> BusLimits {
        BusLimits {
            max_clock_hz: 62_500_000,
            max_transfer_size: 4096,
            gpio_count: 30,
        }
    }

    #[test]
    fn test_allocator() {
        let mut alloc = LineAllocator::new(30);

        assert!(alloc.allocate(LineRole::Reset, 11).is_ok());
        assert!(alloc.is_allocated(11));

        // Can't allocate same pin twice
        assert_eq!(
            alloc.allocate(LineRole::Ready, 11),
            Err(ConfigError::PinConflict {
                role: LineRole::Ready,
                pin: 11
            })
        );

        // Out of range
        assert_eq!(
            alloc.allocate(LineRole::Miso, 30),
            Err(ConfigError::InvalidPin {
                role: LineRole::Miso,
                pin: 30
            })
        );
        assert!(!alloc.is_allocated(30));
    }

    #[test]
    fn test_valid_assignment() {
        assert!(pins().validate(30).is_ok());
    }

    #[test]
    fn test_every_role_listed() {
        let lines = pins().lines();
        let roles = lines.map(|(role, _)| role);

        assert_eq!(
            roles,
            [
                LineRole::Reset,
                LineRole::Ready,
                LineRole::ChipSelect,
                LineRole::Clock,
                LineRole::Mosi,
                LineRole::Miso,
            ]
        );
        assert_eq!(lines[2], (LineRole::ChipSelect, 17));
    }

    #[test]
    fn test_shared_line_rejected() {
        let mut p = pins();
        p.ready = p.reset;
        assert_eq!(
            p.validate(30),
            Err(ConfigError::PinConflict {
                role: LineRole::Ready,
                pin: 20
            })
        );
    }

    #[test]
    fn test_conflict_names_later_role() {
        let mut p = pins();
        p.miso = p.sclk;
        assert_eq!(
            p.validate(30),
            Err(ConfigError::PinConflict {
                role: LineRole::Miso,
                pin: 18
            })
        );
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut p = pins();
        p.cs = 31;
        assert_eq!(
            p.validate(30),
            Err(ConfigError::InvalidPin {
                role: LineRole::ChipSelect,
                pin: 31
            })
        );
    }

    #[test]
    fn test_board_validation() {
        let mut board = BoardConfig::new(0, pins());
        assert!(board.validate(&limits()).is_ok());

        board.max_transfer_size = 0;
        assert_eq!(board.validate(&limits()), Err(ConfigError::TransferSize));

        board.max_transfer_size = 8192;
        assert_eq!(board.validate(&limits()), Err(ConfigError::TransferSize));
    }

    #[test]
    fn test_clock_limit() {
        assert!(limits().check_clock(8_000_000).is_ok());
        assert!(limits().check_clock(62_500_000).is_ok());
        assert_eq!(
            limits().check_clock(62_500_001),
            Err(ConfigError::ClockTooFast)
        );
        assert_eq!(limits().check_clock(0), Err(ConfigError::ClockTooFast));
    }

    #[test]
    fn test_derived_bus_config() {
        let board = BoardConfig::new(1, pins());
        let bus = board.bus_config();
        assert_eq!(bus.host, 1);
        assert_eq!(bus.sclk_pin, 18);
        assert_eq!(bus.mosi_pin, 19);
        assert_eq!(bus.miso_pin, 16);
        assert_eq!(bus.max_transfer_size, DEFAULT_MAX_TRANSFER_SIZE);

        let dev = board.device_config(4_000_000);
        assert_eq!(dev.clock_speed_hz, 4_000_000);
        assert_eq!(dev.cs_pin, 17);
        assert_eq!(dev.queue_size, 1);
    }

    #[test]
    fn test_timeout_conversion() {
        assert_eq!(InitParams::spi(1_000_000, 3).timeout_us(), 3_000);
        assert_eq!(InitParams::spi(1_000_000, 0).timeout_us(), 0);
        assert_eq!(InitParams::spi(1_000_000, u32::MAX).timeout_us(), u32::MAX);
    }
}
