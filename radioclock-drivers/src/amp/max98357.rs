//! MAX98357 I2S amplifier control pins
//!
//! Audio data goes over I2S; this driver only handles the two static
//! control inputs:
//!
//! - SD: high enables the amplifier, low puts it in shutdown
//! - GAIN: high selects 6 dB, low selects 12 dB

use core::convert::Infallible;

use embedded_hal::digital::{OutputPin, PinState};
use radioclock_core::config::OutputGain;

/// Amplifier with shutdown and gain pins
pub struct Max98357<SD, GAIN> {
    sd: SD,
    gain_pin: GAIN,
    gain: OutputGain,
    enabled: bool,
}

impl<SD, GAIN> Max98357<SD, GAIN>
where
    SD: OutputPin<Error = Infallible>,
    GAIN: OutputPin<Error = Infallible>,
{
    /// Create a driver, select `gain` and enable the amplifier
    pub fn new(sd: SD, gain_pin: GAIN, gain: OutputGain) -> Self {
        let mut amp = Self {
            sd,
            gain_pin,
            gain,
            enabled: false,
        };
        amp.set_gain(gain);
        amp.enable();
        amp
    }

    /// Select the gain stage
    pub fn set_gain(&mut self, gain: OutputGain) {
        let state = match gain {
            OutputGain::Db6 => PinState::High,
            OutputGain::Db12 => PinState::Low,
        };
        let Ok(()) = self.gain_pin.set_state(state);
        self.gain = gain;
    }

    /// Current gain stage
    pub fn gain(&self) -> OutputGain {
        self.gain
    }

    /// Leave shutdown
    pub fn enable(&mut self) {
        let Ok(()) = self.sd.set_high();
        self.enabled = true;
    }

    /// Enter shutdown
    pub fn shutdown(&mut self) {
        let Ok(()) = self.sd.set_low();
        self.enabled = false;
    }

    /// Check if the amplifier is out of shutdown
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}
