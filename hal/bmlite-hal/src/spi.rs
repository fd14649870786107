//! SPI bus abstractions
//!
//! Splits the peripheral into the two steps a bus driver exposes: bring up
//! the bus itself ([`SpiMaster`]) and attach a device to it, which yields a
//! [`SpiDevice`] handle that owns chip-select and runs transactions.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::gpio::{LineConfig, OutputPin};

/// Default ceiling for a single transfer in bytes
pub const DEFAULT_MAX_TRANSFER_SIZE: usize = 1024;

/// SPI bus master
///
/// Implementations bring up the bus clock and data lines, then hand out a
/// device handle. A failure in either step is reported with the
/// implementation's own error type.
pub trait SpiMaster {
    /// Error type for bus bring-up
    type Error;

    /// Device handle produced by [`SpiMaster::add_device`]
    type Device: SpiDevice;

    /// Initialize the bus (clock, data lines, DMA)
    fn init_bus(&mut self, config: &BusConfig) -> Result<(), Self::Error>;

    /// Attach a device to an initialized bus
    fn add_device(&mut self, config: &DeviceConfig) -> Result<Self::Device, Self::Error>;
}

/// A device attached to an SPI bus
pub trait SpiDevice {
    /// Error type for transactions
    type Error;

    /// Run one full-duplex transaction, blocking until it completes
    ///
    /// Chip-select is asserted for the duration of the transaction. When
    /// [`Transaction::keep_cs_active`] is set it stays asserted afterwards,
    /// and the next transaction continues without a deselect edge.
    fn transmit(&mut self, transaction: &mut Transaction<'_>) -> Result<(), Self::Error>;
}

/// A single bus transaction
///
/// Either buffer may be absent. When both are present they are clocked
/// simultaneously: byte `i` of `tx` goes out while byte `i` of `rx` comes in.
#[derive(Debug)]
pub struct Transaction<'a> {
    /// Bytes clocked out, or `None` to clock out filler
    pub tx: Option<&'a [u8]>,
    /// Buffer filled with bytes clocked in, or `None` to discard them
    pub rx: Option<&'a mut [u8]>,
    /// Transaction length in bytes
    pub length: usize,
    /// Leave chip-select asserted when the transaction ends
    pub keep_cs_active: bool,
}

/// Software chip-select on a plain output line
///
/// Active low. The line is latched high before it becomes an output, and
/// a held selection carries over into the next [`ChipSelect::run`] without
/// a deselect edge.
#[derive(Debug)]
pub struct ChipSelect<P> {
    pin: P,
    selected: bool,
}

impl<P: OutputPin> ChipSelect<P> {
    /// Take `pin` and park it deselected
    pub fn new(mut pin: P) -> Self {
        pin.set_high();
        pin.configure(LineConfig::CHIP_SELECT_OUTPUT);
        Self {
            pin,
            selected: false,
        }
    }

    /// Whether the device is currently selected
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Assert the line; no edge if it is already held
    pub fn select(&mut self) {
        if !self.selected {
            self.pin.set_low();
            self.selected = true;
        }
    }

    /// Release the line
    pub fn deselect(&mut self) {
        self.pin.set_high();
        self.selected = false;
    }

    /// Run `exchange` with the device selected
    ///
    /// The line is released afterwards unless `keep_active` is set and the
    /// exchange succeeded.
    pub fn run<T, E>(
        &mut self,
        keep_active: bool,
        exchange: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        self.select();
        let result = exchange();
        if result.is_err() || !keep_active {
            self.deselect();
        }
        result
    }

    /// Give the pin back
    pub fn release(self) -> P {
        self.pin
    }
}

/// Bus-level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BusConfig {
    /// Peripheral instance (0 for SPI0, 1 for SPI1, ...)
    pub host: u8,
    /// Clock line GPIO
    pub sclk_pin: u8,
    /// Controller-out line GPIO
    pub mosi_pin: u8,
    /// Controller-in line GPIO
    pub miso_pin: u8,
    /// Largest single transfer in bytes
    pub max_transfer_size: usize,
}

/// Per-device configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceConfig {
    /// Clock polarity and phase
    pub mode: Mode,
    /// Clock frequency in Hz
    pub clock_speed_hz: u32,
    /// Chip-select line GPIO
    pub cs_pin: u8,
    /// Number of transactions that may be in flight
    pub queue_size: u8,
}

impl DeviceConfig {
    /// Mode 0 device at `clock_speed_hz` with one transaction in flight
    pub const fn new(clock_speed_hz: u32, cs_pin: u8) -> Self {
        Self {
            mode: Mode::Mode0,
            clock_speed_hz,
            cs_pin,
            queue_size: 1,
        }
    }
}

/// SPI clock polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Polarity {
    /// Clock idles low (CPOL=0)
    IdleLow,
    /// Clock idles high (CPOL=1)
    IdleHigh,
}

/// SPI clock phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Phase {
    /// Data captured on first clock transition (CPHA=0)
    CaptureOnFirstTransition,
    /// Data captured on second clock transition (CPHA=1)
    CaptureOnSecondTransition,
}

/// SPI mode (combined polarity and phase)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Mode {
    /// Mode 0: CPOL=0, CPHA=0
    Mode0,
    /// Mode 1: CPOL=0, CPHA=1
    Mode1,
    /// Mode 2: CPOL=1, CPHA=0
    Mode2,
    /// Mode 3: CPOL=1, CPHA=1
    Mode3,
}

impl From<Mode> for (Polarity, Phase) {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Mode0 => (Polarity::IdleLow, Phase::CaptureOnFirstTransition),
            Mode::Mode1 => (Polarity::IdleLow, Phase::CaptureOnSecondTransition),
            Mode::Mode2 => (Polarity::IdleHigh, Phase::CaptureOnFirstTransition),
            Mode::Mode3 => (Polarity::IdleHigh, Phase::CaptureOnSecondTransition),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    /// Output that records every level it is driven to
    #[derive(Default)]
    struct EdgeLog {
        high: bool,
        levels: Vec<bool>,
        configured_high: Option<bool>,
    }

    impl OutputPin for EdgeLog {
        fn configure(&mut self, _config: LineConfig) {
            self.configured_high = Some(self.high);
        }

        fn set_high(&mut self) {
            self.high = true;
            self.levels.push(true);
        }

        fn set_low(&mut self) {
            self.high = false;
            self.levels.push(false);
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    #[test]
    fn test_cs_parked_high_before_output() {
        let cs = ChipSelect::new(EdgeLog::default());
        assert!(!cs.is_selected());

        let pin = cs.release();
        assert_eq!(pin.configured_high, Some(true));
        assert_eq!(pin.levels, [true]);
    }

    #[test]
    fn test_cs_released_after_exchange() {
        let mut cs = ChipSelect::new(EdgeLog::default());

        let result: Result<u8, ()> = cs.run(false, || Ok(7));

        assert_eq!(result, Ok(7));
        assert!(!cs.is_selected());
        assert_eq!(cs.release().levels, [true, false, true]);
    }

    #[test]
    fn test_cs_held_across_exchanges() {
        let mut cs = ChipSelect::new(EdgeLog::default());

        cs.run::<_, ()>(true, || Ok(())).unwrap();
        assert!(cs.is_selected());
        cs.run::<_, ()>(true, || Ok(())).unwrap();
        assert!(cs.is_selected());
        cs.run::<_, ()>(false, || Ok(())).unwrap();

        // One select edge for the whole chain
        assert!(!cs.is_selected());
        assert_eq!(cs.release().levels, [true, false, true]);
    }

    #[test]
    fn test_cs_released_on_error_even_when_held() {
        let mut cs = ChipSelect::new(EdgeLog::default());

        let result: Result<(), &str> = cs.run(true, || Err("bus fault"));

        assert_eq!(result, Err("bus fault"));
        assert!(!cs.is_selected());
        assert!(cs.release().is_set_high());
    }

    #[test]
    fn test_cs_deselect_is_explicit() {
        let mut cs = ChipSelect::new(EdgeLog::default());
        cs.select();
        cs.select();
        assert!(cs.is_selected());

        cs.deselect();
        assert_eq!(cs.release().levels, [true, false, true]);
    }

    #[test]
    fn test_device_config_defaults() {
        let cfg = DeviceConfig::new(1_000_000, 17);
        assert_eq!(cfg.mode, Mode::Mode0);
        assert_eq!(cfg.queue_size, 1);
        assert_eq!(cfg.cs_pin, 17);
    }

    #[test]
    fn test_mode_split() {
        let (pol, pha): (Polarity, Phase) = Mode::Mode0.into();
        assert_eq!(pol, Polarity::IdleLow);
        assert_eq!(pha, Phase::CaptureOnFirstTransition);

        let (pol, pha): (Polarity, Phase) = Mode::Mode3.into();
        assert_eq!(pol, Polarity::IdleHigh);
        assert_eq!(pha, Phase::CaptureOnSecondTransition);
    }
}
