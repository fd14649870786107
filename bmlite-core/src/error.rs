//! Transport error model

use core::fmt;

/// Errors surfaced by the transport HAL
///
/// Everything else the HAL does (reset, status sampling, ticks, waits) is
/// infallible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalError {
    /// Setup or usage fault: the peripheral refused to initialize or attach,
    /// or a request was outside the configured bounds. Not retried.
    Internal,
    /// A single bus transaction failed. The caller owns retry policy.
    Io,
}

impl fmt::Display for HalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HalError::Internal => f.write_str("internal error"),
            HalError::Io => f.write_str("an I/O error occurred"),
        }
    }
}
