//! Blocking SPI binding for the sensor bus
//!
//! The RP2040 SPI block's hardware chip-select deasserts between every
//! frame, which breaks held exchanges. Chip-select is therefore driven in
//! software on a plain GPIO, and the data pins are bound when the
//! `embassy_rp` driver is built.

use bmlite_core::config::BusLimits;
use bmlite_hal::spi::{Mode, Phase, Polarity};
use bmlite_hal::{BusConfig, ChipSelect, DeviceConfig, SpiDevice, SpiMaster, Transaction};
use embassy_rp::spi::{self, Blocking, Instance, Spi};

use crate::gpio::OutputLine;

/// RP2040 ceilings
///
/// `clk_peri` runs at 125 MHz and the SPI block divides by at least two.
pub const RP2040_LIMITS: BusLimits = BusLimits {
    max_clock_hz: 62_500_000,
    max_transfer_size: 4096,
    gpio_count: 30,
};

/// Filler clocked out when a transaction has nothing to send
const FILLER: [u8; 32] = [0u8; 32];

/// Error from SPI bring-up or transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rp2040SpiError {
    /// Bus configuration names pins the driver was not built with
    WiringMismatch,
    /// Max transfer size outside the chip's ceiling
    TransferSize,
    /// Clock outside the chip's range
    Clock,
    /// Device attached before the bus was initialized
    NotInitialized,
    /// Only one device, one transaction deep, is supported
    AlreadyAttached,
    /// Queue depth other than one requested
    QueueDepth,
    /// Buffer shorter than the transaction length
    Length,
    /// Peripheral reported a failure
    Transfer,
}

impl From<spi::Error> for Rp2040SpiError {
    fn from(_: spi::Error) -> Self {
        Rp2040SpiError::Transfer
    }
}

/// Pins the SPI driver was built with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiWiring {
    pub sclk: u8,
    pub mosi: u8,
    pub miso: u8,
    pub cs: u8,
}

/// SPI master over a blocking `embassy_rp` driver
pub struct Rp2040SpiMaster<'d, T: Instance> {
    spi: Option<Spi<'d, T, Blocking>>,
    cs: Option<OutputLine<'d>>,
    wiring: SpiWiring,
    bus_ready: bool,
}

impl<'d, T: Instance> Rp2040SpiMaster<'d, T> {
    /// Wrap a blocking driver and the chip-select pin
    pub fn new(spi: Spi<'d, T, Blocking>, cs: OutputLine<'d>, wiring: SpiWiring) -> Self {
        Self {
            spi: Some(spi),
            cs: Some(cs),
            wiring,
            bus_ready: false,
        }
    }
}

/// Translate a HAL mode into the driver's polarity and phase
fn driver_mode(mode: Mode) -> (spi::Polarity, spi::Phase) {
    let (polarity, phase): (Polarity, Phase) = mode.into();
    let polarity = match polarity {
        Polarity::IdleLow => spi::Polarity::IdleLow,
        Polarity::IdleHigh => spi::Polarity::IdleHigh,
    };
    let phase = match phase {
        Phase::CaptureOnFirstTransition => spi::Phase::CaptureOnFirstTransition,
        Phase::CaptureOnSecondTransition => spi::Phase::CaptureOnSecondTransition,
    };
    (polarity, phase)
}

impl<'d, T: Instance> SpiMaster for Rp2040SpiMaster<'d, T> {
    type Error = Rp2040SpiError;
    type Device = Rp2040SpiDevice<'d, T>;

    fn init_bus(&mut self, config: &BusConfig) -> Result<(), Self::Error> {
        let wired = (self.wiring.sclk, self.wiring.mosi, self.wiring.miso);
        if (config.sclk_pin, config.mosi_pin, config.miso_pin) != wired {
            return Err(Rp2040SpiError::WiringMismatch);
        }
        RP2040_LIMITS
            .check_transfer_size(config.max_transfer_size)
            .map_err(|_| Rp2040SpiError::TransferSize)?;

        self.bus_ready = true;
        Ok(())
    }

    fn add_device(&mut self, config: &DeviceConfig) -> Result<Self::Device, Self::Error> {
        if !self.bus_ready {
            return Err(Rp2040SpiError::NotInitialized);
        }
        if config.cs_pin != self.wiring.cs {
            return Err(Rp2040SpiError::WiringMismatch);
        }
        if config.queue_size != 1 {
            return Err(Rp2040SpiError::QueueDepth);
        }
        RP2040_LIMITS
            .check_clock(config.clock_speed_hz)
            .map_err(|_| Rp2040SpiError::Clock)?;

        let (mut spi, cs) = match (self.spi.take(), self.cs.take()) {
            (Some(spi), Some(cs)) => (spi, cs),
            _ => return Err(Rp2040SpiError::AlreadyAttached),
        };

        let (polarity, phase) = driver_mode(config.mode);
        let mut driver_config = spi::Config::default();
        driver_config.frequency = config.clock_speed_hz;
        driver_config.polarity = polarity;
        driver_config.phase = phase;
        spi.set_config(&driver_config);

        Ok(Rp2040SpiDevice {
            spi,
            cs: ChipSelect::new(cs),
        })
    }
}

/// The sensor attached to the bus
pub struct Rp2040SpiDevice<'d, T: Instance> {
    spi: Spi<'d, T, Blocking>,
    cs: ChipSelect<OutputLine<'d>>,
}

/// Clock one transaction through the driver
fn exchange<T: Instance>(
    spi: &mut Spi<'_, T, Blocking>,
    t: &mut Transaction<'_>,
) -> Result<(), Rp2040SpiError> {
    let len = t.length;
    let tx = match t.tx {
        Some(tx) => Some(tx.get(..len).ok_or(Rp2040SpiError::Length)?),
        None => None,
    };
    let rx = match t.rx.as_deref_mut() {
        Some(rx) => Some(rx.get_mut(..len).ok_or(Rp2040SpiError::Length)?),
        None => None,
    };

    match (tx, rx) {
        (Some(tx), Some(rx)) => spi.blocking_transfer(rx, tx)?,
        (Some(tx), None) => spi.blocking_write(tx)?,
        (None, Some(rx)) => spi.blocking_read(rx)?,
        (None, None) => {
            let mut remaining = len;
            while remaining > 0 {
                let n = remaining.min(FILLER.len());
                spi.blocking_write(&FILLER[..n])?;
                remaining -= n;
            }
        }
    }
    Ok(())
}

impl<'d, T: Instance> SpiDevice for Rp2040SpiDevice<'d, T> {
    type Error = Rp2040SpiError;

    fn transmit(&mut self, transaction: &mut Transaction<'_>) -> Result<(), Self::Error> {
        let keep = transaction.keep_cs_active;
        let spi = &mut self.spi;
        self.cs.run(keep, || exchange(spi, transaction))
    }
}
