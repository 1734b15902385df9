//! Embassy async tasks
//!
//! The time base runs on the interrupt executor, motion on core 1, and
//! everything else on the core 0 thread executor.

pub mod audio;
pub mod motion;
pub mod net;
pub mod time_base;

pub use audio::audio_task;
pub use motion::{motion_task, EmbassyClock, HandStepper};
pub use net::{cyw43_task, net_task};
pub use time_base::time_base_task;
