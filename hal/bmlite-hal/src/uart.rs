//! UART serial link abstractions
//!
//! The sensor can also be wired over a serial line. Boards that do so
//! implement [`SerialLink`]; the transport only ever counts bytes moved.

/// Baud rate the sensor's serial interface comes up at
pub const DEFAULT_BAUDRATE: u32 = 921_600;

/// Byte-oriented serial link
///
/// Both operations return the number of bytes actually moved. Zero means
/// nothing was transferred.
pub trait SerialLink {
    /// Write bytes to the link
    fn write(&mut self, data: &[u8]) -> usize;

    /// Read bytes from the link into `buf`
    fn read(&mut self, buf: &mut [u8]) -> usize;
}

/// Serial line settings
///
/// Framing is fixed at 8N1 by the sensor, so only the rate and flow
/// control are configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// RTS/CTS hardware flow control
    pub flow_control: bool,
}

impl UartConfig {
    /// 8N1 at `baudrate`, no flow control
    pub const fn new(baudrate: u32) -> Self {
        Self {
            baudrate,
            flow_control: false,
        }
    }
}

impl Default for UartConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BAUDRATE)
    }
}
