//! Board peripherals wrapped in the core's output traits.

#![cfg(target_os = "none")]

use core::convert::Infallible;

use embassy_stm32::gpio::Output;
use flicker_core::signal::{Level, LedOutput};

mod pot;

pub use pot::Potentiometer;

/// Push-pull LED driven by the oscillator.
pub struct LedPin<'d> {
    pin: Output<'d>,
}

impl<'d> LedPin<'d> {
    pub fn new(pin: Output<'d>) -> Self {
        Self { pin }
    }
}

impl LedOutput for LedPin<'_> {
    type Error = Infallible;

    fn set_level(&mut self, level: Level) -> Result<(), Self::Error> {
        match level {
            Level::High => self.pin.set_high(),
            Level::Low => self.pin.set_low(),
        }
        Ok(())
    }
}
