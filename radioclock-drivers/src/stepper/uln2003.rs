//! ULN2003 Darlington driver for a four-wire unipolar stepper
//!
//! The 28BYJ-48 driven in half-step mode: eight coil patterns per cycle,
//! 4096 half-steps per output shaft revolution. The driver has no state
//! of its own; the pattern is derived from the absolute position, so a
//! position always maps to the same coils.

use core::convert::Infallible;

use embedded_hal::digital::{OutputPin, PinState};
use radioclock_core::traits::StepOutput;

/// Coil patterns, bit 0 = IN1 ... bit 3 = IN4
pub const HALF_STEP_SEQUENCE: [u8; 8] = [
    0b0001, 0b0011, 0b0010, 0b0110, 0b0100, 0b1100, 0b1000, 0b1001,
];

/// Four GPIOs wired to IN1..IN4
pub struct Uln2003<P> {
    pins: [P; 4],
}

impl<P: OutputPin<Error = Infallible>> Uln2003<P> {
    /// Create a driver and energise the coils for `position`
    pub fn new(pins: [P; 4], position: u32) -> Self {
        let mut driver = Self { pins };
        driver.apply(position);
        driver
    }

    /// Coil pattern for a position
    pub fn pattern(position: u32) -> u8 {
        HALF_STEP_SEQUENCE[(position & 7) as usize]
    }

    fn apply(&mut self, position: u32) {
        let pattern = Self::pattern(position);
        for (i, pin) in self.pins.iter_mut().enumerate() {
            let Ok(()) = pin.set_state(PinState::from(pattern & (1 << i) != 0));
        }
    }

    /// Release the pins
    pub fn free(self) -> [P; 4] {
        self.pins
    }
}

impl<P: OutputPin<Error = Infallible>> StepOutput for Uln2003<P> {
    fn step(&mut self, position: u32) {
        self.apply(position);
    }
}
