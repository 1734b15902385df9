//! State shared between the cores and the time base
//!
//! Everything here is lock-free: the time base only ever adds to the
//! target, and the heartbeats are plain counters.

use radioclock_core::motion::PositionTarget;
use radioclock_core::runtime::{Heartbeat, RunFlag};

/// Where the hand should be, in half-steps since power-up
pub static POSITION_TARGET: PositionTarget = PositionTarget::new(0);

/// Never cleared on the device; both loops run for the life of the process
pub static RUN_FLAG: RunFlag = RunFlag::new();

/// Motion loop iterations
pub static MOTION_BEAT: Heartbeat = Heartbeat::new();

/// Audio loop iterations
pub static AUDIO_BEAT: Heartbeat = Heartbeat::new();
