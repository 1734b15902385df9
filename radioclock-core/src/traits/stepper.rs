//! Stepper output trait
//!
//! The clock hand is driven open-loop: the controller commands steps and
//! nothing reports back where the hand actually is.

/// Trait for stepper outputs
///
/// Implementations energise whatever coils or driver pins correspond to
/// the new absolute position. Positions only ever increase by one between
/// calls.
pub trait StepOutput {
    /// Move the motor to `position`
    fn step(&mut self, position: u32);
}
