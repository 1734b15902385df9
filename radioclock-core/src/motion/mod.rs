//! Clock hand motion
//!
//! The time base credits steps to a shared target; the controller walks
//! the hand toward that target with a bounded speed/acceleration profile.

pub mod controller;
pub mod profile;
pub mod target;
pub mod time_base;

pub use controller::{MotionController, MotionStatus};
pub use profile::{MotionProfile, PlannedStep, StepPlanner};
pub use target::PositionTarget;
pub use time_base::{StepIncrement, TimeBase};
