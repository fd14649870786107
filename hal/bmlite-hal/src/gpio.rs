//! GPIO line abstractions
//!
//! Provides traits for the digital lines the sensor transport drives and
//! samples. Chip-specific HALs implement them on top of their own pin types.

/// Direction of a configured line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Input,
    Output,
}

/// Internal pull resistor selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pull {
    None,
    Up,
    Down,
}

/// Output drive strength
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriveStrength {
    /// Chip default drive
    Normal,
    /// Strongest drive the chip offers
    High,
}

/// Electrical configuration applied to a line once at start-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineConfig {
    pub direction: Direction,
    pub pull: Pull,
    pub drive: DriveStrength,
    /// Edge interrupts on this line. The transport polls, so this is
    /// always off for the lines it owns.
    pub interrupt: bool,
}

impl LineConfig {
    /// Sensor reset: push-pull output, no pull, normal drive
    pub const RESET_OUTPUT: Self = Self {
        direction: Direction::Output,
        pull: Pull::None,
        drive: DriveStrength::Normal,
        interrupt: false,
    };

    /// Software chip-select: push-pull output, no pull, normal drive
    pub const CHIP_SELECT_OUTPUT: Self = Self::RESET_OUTPUT;

    /// Sensor ready/IRQ: floating input, polled
    pub const READY_INPUT: Self = Self {
        direction: Direction::Input,
        pull: Pull::None,
        drive: DriveStrength::Normal,
        interrupt: false,
    };
}

/// Digital output line
///
/// Levels are electrical: `set_high` drives the pin to logic 1 regardless
/// of what that means to the device on the other end.
pub trait OutputPin {
    /// Apply the electrical configuration
    fn configure(&mut self, config: LineConfig);

    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Set the pin to a specific level
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently driven high
    fn is_set_high(&self) -> bool;

    /// Check if the pin is currently driven low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

/// Digital input line
pub trait InputPin {
    /// Apply the electrical configuration
    fn configure(&mut self, config: LineConfig);

    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }
}
