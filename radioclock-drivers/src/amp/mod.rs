//! Audio amplifier drivers

pub mod max98357;

pub use max98357::Max98357;
