//! Millisecond timebase
//!
//! Turns a microsecond clock and a cooperative delay into the tick/wait
//! pair the protocol stack uses for its timeouts.

use bmlite_hal::{Clock, Delay};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Monotonic millisecond count since the clock's epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Tick(u64);

impl Tick {
    /// Tick from a raw millisecond count
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    /// Raw millisecond count
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Milliseconds from `earlier` to `self`
    ///
    /// Only meaningful when both ticks come from the same epoch.
    pub const fn since(self, earlier: Tick) -> u64 {
        self.0.wrapping_sub(earlier.0)
    }
}

/// Timebase over a microsecond clock and a cooperative delay
pub struct Timebase<C, D> {
    clock: C,
    delay: D,
}

impl<C: Clock, D: Delay> Timebase<C, D> {
    pub fn new(clock: C, delay: D) -> Self {
        Self { clock, delay }
    }

    /// Prepare the clock source
    ///
    /// The clocks this runs on are free-running from boot, so there is
    /// nothing to start. Safe to call any number of times.
    pub fn init(&mut self) {}

    /// Current tick, truncated from the microsecond clock
    pub fn get_tick(&self) -> Tick {
        Tick(self.clock.now_micros() / 1000)
    }

    /// Suspend for at least `duration_ms`, yielding to the executor
    ///
    /// Goes straight to the delay and never reads the clock. There is no
    /// way to cut this short. Loops that need to give up early should poll
    /// [`Timebase::elapsed_ms`] with short waits instead.
    pub async fn busy_wait(&mut self, duration_ms: u32) {
        self.delay.delay_ms(duration_ms).await;
    }

    /// Milliseconds elapsed since `since`
    pub fn elapsed_ms(&self, since: Tick) -> u64 {
        self.get_tick().since(since)
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use core::cell::Cell;
    use std::rc::Rc;

    use bmlite_hal::{Clock, Delay};

    /// Manually advanced clock; clones share the same time
    #[derive(Clone, Default)]
    pub struct ManualClock {
        micros: Rc<Cell<u64>>,
        reads: Rc<Cell<u32>>,
    }

    impl ManualClock {
        /// Number of times the time has been read
        pub fn reads(&self) -> u32 {
            self.reads.get()
        }

        pub fn set(&self, micros: u64) {
            self.micros.set(micros);
        }

        pub fn advance(&self, micros: u64) {
            self.micros.set(self.micros.get() + micros);
        }
    }

    impl Clock for ManualClock {
        fn now_micros(&self) -> u64 {
            self.reads.set(self.reads.get() + 1);
            self.micros.get()
        }
    }

    /// Delay that advances a [`ManualClock`] instead of sleeping
    pub struct SteppingDelay {
        pub clock: ManualClock,
        pub calls: u32,
        pub total_ms: u64,
    }

    impl SteppingDelay {
        pub fn new(clock: ManualClock) -> Self {
            Self {
                clock,
                calls: 0,
                total_ms: 0,
            }
        }
    }

    impl Delay for SteppingDelay {
        async fn delay_ms(&mut self, ms: u32) {
            self.calls += 1;
            self.total_ms += ms as u64;
            self.clock.advance(ms as u64 * 1000);
        }
    }
}
