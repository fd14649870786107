//! Serial-line transport placeholder
//!
//! The sensor can be wired over UART, but this board talks SPI only. The
//! byte-count API keeps the historic behavior of moving nothing and
//! reporting zero. Going through [`Phy`] reports
//! [`PhyError::Unsupported`] instead, so picking this transport by mistake
//! shows up as an error rather than as silence.

use bmlite_hal::uart::UartConfig;
use bmlite_hal::SerialLink;

use crate::phy::{Phy, PhyError};

/// Unimplemented UART link
#[derive(Debug, Clone, Copy)]
pub struct UartLink {
    config: UartConfig,
}

impl UartLink {
    pub fn new(baudrate: u32) -> Self {
        Self {
            config: UartConfig::new(baudrate),
        }
    }

    pub fn config(&self) -> &UartConfig {
        &self.config
    }
}

impl SerialLink for UartLink {
    fn write(&mut self, _data: &[u8]) -> usize {
        0
    }

    fn read(&mut self, _buf: &mut [u8]) -> usize {
        0
    }
}

impl Phy for UartLink {
    async fn write(&mut self, _data: &[u8], _timeout_us: u32) -> Result<(), PhyError> {
        Err(PhyError::Unsupported)
    }

    async fn read(&mut self, _buf: &mut [u8], _timeout_us: u32) -> Result<(), PhyError> {
        Err(PhyError::Unsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;

    #[test]
    fn test_byte_counts_are_zero() {
        let mut link = UartLink::new(115_200);
        let mut buf = [0xEEu8; 8];

        assert_eq!(SerialLink::write(&mut link, &[1, 2, 3]), 0);
        assert_eq!(SerialLink::read(&mut link, &mut buf), 0);
        // Nothing moved
        assert_eq!(buf, [0xEE; 8]);
    }

    #[test]
    fn test_phy_reports_unsupported() {
        let mut link = UartLink::new(115_200);
        let mut buf = [0u8; 4];

        assert_eq!(
            block_on(Phy::write(&mut link, &[1], 0)),
            Err(PhyError::Unsupported)
        );
        assert_eq!(
            block_on(Phy::read(&mut link, &mut buf, 1_000)),
            Err(PhyError::Unsupported)
        );
    }

    #[test]
    fn test_keeps_baudrate() {
        let link = UartLink::new(57_600);
        assert_eq!(link.config().baudrate, 57_600);
        assert!(!link.config().flow_control);
    }
}
