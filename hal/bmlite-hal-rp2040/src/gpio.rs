//! Sensor lines on RP2040 GPIOs
//!
//! Every line sits on a `Flex` pin so the electrical configuration can be
//! applied after the pin has been taken from the bank.

use bmlite_hal::gpio::{Direction, DriveStrength, Pull};
use bmlite_hal::{InputPin, LineConfig, OutputPin};
use embassy_rp::gpio::{self, Drive, Flex};

fn driver_pull(pull: Pull) -> gpio::Pull {
    match pull {
        Pull::None => gpio::Pull::None,
        Pull::Up => gpio::Pull::Up,
        Pull::Down => gpio::Pull::Down,
    }
}

fn driver_drive(drive: DriveStrength) -> Drive {
    match drive {
        // RP2040 reset default
        DriveStrength::Normal => Drive::_4mA,
        DriveStrength::High => Drive::_12mA,
    }
}

fn apply(pin: &mut Flex<'_>, config: LineConfig) {
    pin.set_pull(driver_pull(config.pull));
    match config.direction {
        Direction::Output => {
            pin.set_drive_strength(driver_drive(config.drive));
            pin.set_as_output();
        }
        Direction::Input => pin.set_as_input(),
    }
}

/// Output line (sensor reset, chip-select)
pub struct OutputLine<'d> {
    pin: Flex<'d>,
}

impl<'d> OutputLine<'d> {
    pub fn new(pin: Flex<'d>) -> Self {
        Self { pin }
    }
}

impl OutputPin for OutputLine<'_> {
    fn configure(&mut self, config: LineConfig) {
        apply(&mut self.pin, config);
    }

    fn set_high(&mut self) {
        self.pin.set_high();
    }

    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}

/// Input line (sensor ready/IRQ)
///
/// Polled only; no GPIO interrupt is ever armed on it.
pub struct InputLine<'d> {
    pin: Flex<'d>,
}

impl<'d> InputLine<'d> {
    pub fn new(pin: Flex<'d>) -> Self {
        Self { pin }
    }
}

impl InputPin for InputLine<'_> {
    fn configure(&mut self, config: LineConfig) {
        apply(&mut self.pin, config);
    }

    fn is_high(&self) -> bool {
        self.pin.is_high()
    }
}
