//! BM-Lite Hardware Abstraction Layer
//!
//! This crate defines the peripheral traits the sensor transport is built
//! on. Chip-specific crates implement them, so the transport logic in
//! `bmlite-core` runs unchanged on any board (and against mocks on the host).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Protocol stack (HCP framing, external) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  bmlite-core (transport session)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  bmlite-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │  bmlite-hal-  │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Reset and ready lines
//! - [`spi::SpiMaster`], [`spi::SpiDevice`] - Bus bring-up and transactions
//! - [`spi::ChipSelect`] - Software chip-select over any output line
//! - [`time::Clock`], [`time::Delay`] - Timebase
//! - [`uart::SerialLink`] - Serial fallback

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod gpio;
pub mod spi;
pub mod time;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use gpio::{InputPin, LineConfig, OutputPin};
pub use spi::{BusConfig, ChipSelect, DeviceConfig, SpiDevice, SpiMaster, Transaction};
pub use time::{Clock, Delay};
pub use uart::SerialLink;
