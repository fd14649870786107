//! Timebase on the embassy time driver

use bmlite_hal::{Clock, Delay};
use embassy_time::{Instant, Timer};

/// Microsecond clock backed by the embassy time driver (since boot)
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_micros(&self) -> u64 {
        Instant::now().as_micros()
    }
}

/// Delay on an embassy timer
///
/// The waiting task is parked until the alarm fires, so other tasks keep
/// running.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyDelay;

impl Delay for EmbassyDelay {
    async fn delay_ms(&mut self, ms: u32) {
        Timer::after_millis(u64::from(ms)).await;
    }
}
