//! Dynamic pin allocation for config-driven wiring
//!
//! The reset, ready and chip-select lines come from the board config by
//! GPIO number. The SPI data pins are bound by type when the driver is
//! built, so they come out of [`GpioPeripherals`] first and the bank is
//! built from whatever is left.

use embassy_rp::gpio::{AnyPin, Flex};
use embassy_rp::{peripherals, Peri, Peripherals};

/// Number of GPIOs on the RP2040
pub const GPIO_COUNT: u8 = 30;

/// Why a GPIO could not be claimed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// GPIO number past the last pin on the chip
    OutOfRange(u8),
    /// GPIO already handed out, or bound to the SPI driver
    Claimed(u8),
}

/// Free GPIOs, claimed by number from the board config
pub struct PinBank {
    pins: [Option<Peri<'static, AnyPin>>; GPIO_COUNT as usize],
}

impl PinBank {
    /// Collect whatever GPIOs are still left in `p`
    ///
    /// Slots emptied earlier (the SPI data pins) stay claimed.
    pub fn new(p: &mut GpioPeripherals) -> Self {
        Self {
            pins: [
                p.pin0.take().map(Peri::into),
                p.pin1.take().map(Peri::into),
                p.pin2.take().map(Peri::into),
                p.pin3.take().map(Peri::into),
                p.pin4.take().map(Peri::into),
                p.pin5.take().map(Peri::into),
                p.pin6.take().map(Peri::into),
                p.pin7.take().map(Peri::into),
                p.pin8.take().map(Peri::into),
                p.pin9.take().map(Peri::into),
                p.pin10.take().map(Peri::into),
                p.pin11.take().map(Peri::into),
                p.pin12.take().map(Peri::into),
                p.pin13.take().map(Peri::into),
                p.pin14.take().map(Peri::into),
                p.pin15.take().map(Peri::into),
                p.pin16.take().map(Peri::into),
                p.pin17.take().map(Peri::into),
                p.pin18.take().map(Peri::into),
                p.pin19.take().map(Peri::into),
                p.pin20.take().map(Peri::into),
                p.pin21.take().map(Peri::into),
                p.pin22.take().map(Peri::into),
                p.pin23.take().map(Peri::into),
                p.pin24.take().map(Peri::into),
                p.pin25.take().map(Peri::into),
                p.pin26.take().map(Peri::into),
                p.pin27.take().map(Peri::into),
                p.pin28.take().map(Peri::into),
                p.pin29.take().map(Peri::into),
            ],
        }
    }

    /// Claim GPIO `gpio`
    pub fn claim(&mut self, gpio: u8) -> Result<Peri<'static, AnyPin>, PinError> {
        let slot = self
            .pins
            .get_mut(usize::from(gpio))
            .ok_or(PinError::OutOfRange(gpio))?;
        slot.take().ok_or(PinError::Claimed(gpio))
    }

    /// Claim GPIO `gpio` as an unconfigured `Flex`
    ///
    /// The line drivers set direction and pulls themselves.
    pub fn claim_flex(&mut self, gpio: u8) -> Result<Flex<'static>, PinError> {
        self.claim(gpio).map(Flex::new)
    }
}

/// The RP2040's GPIOs split out of the embassy `Peripherals`
///
/// Each slot can be emptied on its own, which lets the SPI driver bind its
/// data pins by type before the rest go into a [`PinBank`].
pub struct GpioPeripherals {
    pub pin0: Option<Peri<'static, peripherals::PIN_0>>,
    pub pin1: Option<Peri<'static, peripherals::PIN_1>>,
    pub pin2: Option<Peri<'static, peripherals::PIN_2>>,
    pub pin3: Option<Peri<'static, peripherals::PIN_3>>,
    pub pin4: Option<Peri<'static, peripherals::PIN_4>>,
    pub pin5: Option<Peri<'static, peripherals::PIN_5>>,
    pub pin6: Option<Peri<'static, peripherals::PIN_6>>,
    pub pin7: Option<Peri<'static, peripherals::PIN_7>>,
    pub pin8: Option<Peri<'static, peripherals::PIN_8>>,
    pub pin9: Option<Peri<'static, peripherals::PIN_9>>,
    pub pin10: Option<Peri<'static, peripherals::PIN_10>>,
    pub pin11: Option<Peri<'static, peripherals::PIN_11>>,
    pub pin12: Option<Peri<'static, peripherals::PIN_12>>,
    pub pin13: Option<Peri<'static, peripherals::PIN_13>>,
    pub pin14: Option<Peri<'static, peripherals::PIN_14>>,
    pub pin15: Option<Peri<'static, peripherals::PIN_15>>,
    pub pin16: Option<Peri<'static, peripherals::PIN_16>>,
    pub pin17: Option<Peri<'static, peripherals::PIN_17>>,
    pub pin18: Option<Peri<'static, peripherals::PIN_18>>,
    pub pin19: Option<Peri<'static, peripherals::PIN_19>>,
    pub pin20: Option<Peri<'static, peripherals::PIN_20>>,
    pub pin21: Option<Peri<'static, peripherals::PIN_21>>,
    pub pin22: Option<Peri<'static, peripherals::PIN_22>>,
    pub pin23: Option<Peri<'static, peripherals::PIN_23>>,
    pub pin24: Option<Peri<'static, peripherals::PIN_24>>,
    pub pin25: Option<Peri<'static, peripherals::PIN_25>>,
    pub pin26: Option<Peri<'static, peripherals::PIN_26>>,
    pub pin27: Option<Peri<'static, peripherals::PIN_27>>,
    pub pin28: Option<Peri<'static, peripherals::PIN_28>>,
    pub pin29: Option<Peri<'static, peripherals::PIN_29>>,
}

impl GpioPeripherals {
    /// Split the GPIOs off, keeping the SPI blocks aside
    pub fn split(p: Peripherals) -> (Self, SpiPeripherals) {
        let gpios = Self {
            pin0: Some(p.PIN_0),
            pin1: Some(p.PIN_1),
            pin2: Some(p.PIN_2),
            pin3: Some(p.PIN_3),
            pin4: Some(p.PIN_4),
            pin5: Some(p.PIN_5),
            pin6: Some(p.PIN_6),
            pin7: Some(p.PIN_7),
            pin8: Some(p.PIN_8),
            pin9: Some(p.PIN_9),
            pin10: Some(p.PIN_10),
            pin11: Some(p.PIN_11),
            pin12: Some(p.PIN_12),
            pin13: Some(p.PIN_13),
            pin14: Some(p.PIN_14),
            pin15: Some(p.PIN_15),
            pin16: Some(p.PIN_16),
            pin17: Some(p.PIN_17),
            pin18: Some(p.PIN_18),
            pin19: Some(p.PIN_19),
            pin20: Some(p.PIN_20),
            pin21: Some(p.PIN_21),
            pin22: Some(p.PIN_22),
            pin23: Some(p.PIN_23),
            pin24: Some(p.PIN_24),
            pin25: Some(p.PIN_25),
            pin26: Some(p.PIN_26),
            pin27: Some(p.PIN_27),
            pin28: Some(p.PIN_28),
            pin29: Some(p.PIN_29),
        };
        let spi = SpiPeripherals {
            spi0: p.SPI0,
            spi1: p.SPI1,
        };
        (gpios, spi)
    }
}

/// SPI blocks left over after the split
pub struct SpiPeripherals {
    pub spi0: Peri<'static, peripherals::SPI0>,
    pub spi1: Peri<'static, peripherals::SPI1>,
}
