//! Upstream transport contract
//!
//! The sensor's host communication protocol (framing, commands) lives
//! above this crate. It only needs two byte-moving operations and a
//! receive timeout, which is what [`Phy`] and [`HcpComm`] provide.

use core::fmt;

use crate::config::Interface;
use crate::error::HalError;

/// Errors reported to the protocol layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PhyError {
    /// The sensor did not signal ready within the receive timeout
    Timeout,
    /// The selected transport is not implemented on this board
    Unsupported,
    /// Underlying HAL failure
    Hal(HalError),
}

impl From<HalError> for PhyError {
    fn from(e: HalError) -> Self {
        PhyError::Hal(e)
    }
}

impl fmt::Display for PhyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhyError::Timeout => f.write_str("operation timed out"),
            PhyError::Unsupported => f.write_str("transport not supported"),
            PhyError::Hal(e) => write!(f, "{}", e),
        }
    }
}

/// Byte transport the protocol layer sends frames over
///
/// Both operations may suspend while waiting on the sensor.
#[allow(async_fn_in_trait)]
pub trait Phy {
    /// Send `data` to the sensor
    async fn write(&mut self, data: &[u8], timeout_us: u32) -> Result<(), PhyError>;

    /// Receive exactly `buf.len()` bytes from the sensor
    ///
    /// `timeout_us` bounds how long to wait for the sensor to have data;
    /// zero waits indefinitely.
    async fn read(&mut self, buf: &mut [u8], timeout_us: u32) -> Result<(), PhyError>;
}

/// Communication record shared with the protocol layer
///
/// Owned by the protocol layer; session initialization fills in the
/// selected interface and the receive timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HcpComm {
    /// Transport the record is bound to, `None` until initialization
    pub interface: Option<Interface>,
    /// Receive timeout in microseconds
    pub phy_rx_timeout_us: u32,
}

impl HcpComm {
    /// Whether initialization has bound a transport
    pub fn is_bound(&self) -> bool {
        self.interface.is_some()
    }

    /// Send through `phy`
    pub async fn write<P: Phy>(&self, phy: &mut P, data: &[u8]) -> Result<(), PhyError> {
        phy.write(data, self.phy_rx_timeout_us).await
    }

    /// Receive through `phy` with the stored timeout
    pub async fn read<P: Phy>(&self, phy: &mut P, buf: &mut [u8]) -> Result<(), PhyError> {
        phy.read(buf, self.phy_rx_timeout_us).await
    }
}

/// Convert a microsecond timeout to whole milliseconds
///
/// Rounds up so a short non-zero timeout never turns into "wait forever".
pub const fn timeout_ms(timeout_us: u32) -> u32 {
    timeout_us.div_ceil(1000)
}
