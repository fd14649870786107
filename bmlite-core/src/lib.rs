//! Board-agnostic transport session for the BM-Lite fingerprint sensor
//!
//! This crate contains everything between the sensor's host communication
//! protocol and the chip peripherals that does not depend on a specific
//! board:
//!
//! - Error model and board configuration
//! - Millisecond timebase over a microsecond clock
//! - Reset/ready line control with the sensor's polarities
//! - SPI bus transport with chip-select hold
//! - The transport session facade and the upstream `Phy` contract
//! - The (unimplemented) serial-line transport

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod bus;
pub mod config;
pub mod error;
pub mod line;
pub mod phy;
pub mod session;
pub mod timebase;
pub mod uart;

pub use bus::BusTransport;
pub use config::{BoardConfig, BusLimits, InitParams, Interface, PinAssignment};
pub use error::HalError;
pub use line::LineController;
pub use phy::{HcpComm, Phy, PhyError};
pub use session::{Peripherals, TransportSession};
pub use timebase::{Tick, Timebase};
pub use uart::UartLink;
