//! Reset and ready line control
//!
//! The sensor's reset input is active-low and its ready/IRQ output is
//! active-high. Both conversions between logical state and electrical level
//! happen here and nowhere else.

use bmlite_hal::{InputPin, LineConfig, OutputPin};

/// Electrical level (true = high) that puts the reset line in `assert` state
#[inline]
pub const fn reset_level(assert: bool) -> bool {
    !assert
}

/// Logical ready state for an electrical level (true = high)
#[inline]
pub const fn ready_from_level(high: bool) -> bool {
    high
}

/// Owner of the sensor's reset and ready lines
pub struct LineController<R, S> {
    reset: R,
    ready: S,
}

impl<R: OutputPin, S: InputPin> LineController<R, S> {
    /// Configure both lines and park reset deasserted
    ///
    /// The released level is latched before the pin becomes an output, so
    /// the sensor never sees a reset pulse during bring-up.
    pub fn new(mut reset: R, mut ready: S) -> Self {
        reset.set_state(reset_level(false));
        reset.configure(LineConfig::RESET_OUTPUT);
        ready.configure(LineConfig::READY_INPUT);
        Self { reset, ready }
    }

    /// Drive the reset line; `true` holds the sensor in reset
    pub fn reset(&mut self, assert: bool) {
        self.reset.set_state(reset_level(assert));
    }

    /// Whether the sensor is currently held in reset
    pub fn is_asserted(&self) -> bool {
        self.reset.is_set_high() == reset_level(true)
    }

    /// Whether the sensor signals ready
    pub fn is_ready(&self) -> bool {
        ready_from_level(self.ready.is_high())
    }

    /// Sample the ready line. Pure read, never blocks.
    pub fn get_ready_status(&self) -> bool {
        self.is_ready()
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use core::cell::Cell;
    use std::rc::Rc;

    use bmlite_hal::{InputPin, LineConfig, OutputPin};

    /// Output pin recording its level and configuration
    #[derive(Default)]
    pub struct MockOutput {
        pub high: bool,
        pub config: Option<LineConfig>,
        /// Latched level at the moment the pin was configured
        pub high_when_configured: Option<bool>,
        pub writes: u32,
    }

    impl OutputPin for MockOutput {
        fn configure(&mut self, config: LineConfig) {
            self.config = Some(config);
            self.high_when_configured = Some(self.high);
        }

        fn set_high(&mut self) {
            self.high = true;
            self.writes += 1;
        }

        fn set_low(&mut self) {
            self.high = false;
            self.writes += 1;
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    /// Input pin whose level is set from outside; clones share the level
    #[derive(Clone, Default)]
    pub struct MockInput {
        pub level: Rc<Cell<bool>>,
        pub config: Rc<Cell<Option<LineConfig>>>,
    }

    impl MockInput {
        pub fn set(&self, high: bool) {
            self.level.set(high);
        }
    }

    impl InputPin for MockInput {
        fn configure(&mut self, config: LineConfig) {
            self.config.set(Some(config));
        }

        fn is_high(&self) -> bool {
            self.level.get()
        }
    }
}
