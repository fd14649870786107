//! RP2040-specific HAL for the BM-Lite sensor transport
//!
//! This crate provides RP2040 implementations of the shared `bmlite-hal`
//! traits, plus RP2040-specific functionality:
//!
//! - Dynamic pin allocation for config-driven wiring
//! - Output and input lines on `Flex` GPIOs
//! - Blocking SPI master with software chip-select
//! - Microsecond clock and timer-backed delay on the embassy time driver

#![no_std]

pub mod gpio;
pub mod pins;
pub mod spi;
pub mod time;

pub use gpio::{InputLine, OutputLine};
pub use pins::{GpioPeripherals, PinBank, PinError, SpiPeripherals, GPIO_COUNT};
pub use spi::{Rp2040SpiDevice, Rp2040SpiError, Rp2040SpiMaster, SpiWiring, RP2040_LIMITS};
pub use time::{EmbassyClock, EmbassyDelay};
