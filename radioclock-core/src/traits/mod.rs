//! Hardware abstraction traits
//!
//! These traits define the interface between the application logic
//! and hardware-specific implementations.

pub mod audio;
pub mod clock;
pub mod network;
pub mod stepper;

pub use audio::{AudioStream, StreamState};
pub use clock::Monotonic;
pub use network::{ProvisionError, Provisioner, TimeSource, TimeSyncError};
pub use stepper::StepOutput;
