//! Clock and delay abstractions

/// Free-running microsecond clock
///
/// Must be monotonic within one epoch (typically since boot).
pub trait Clock {
    /// Microseconds since the clock's epoch
    fn now_micros(&self) -> u64;
}

/// Cooperative millisecond delay
///
/// Implementations suspend the calling task and hand the CPU back to the
/// executor until the time is up; they never spin on the clock.
#[allow(async_fn_in_trait)]
pub trait Delay {
    /// Suspend the caller for at least `ms` milliseconds
    async fn delay_ms(&mut self, ms: u32);
}
