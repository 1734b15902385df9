//! Shared position target
//!
//! The only state shared between execution contexts. Written exclusively
//! by the time base (interrupt context), read exclusively by the motion
//! controller.

use portable_atomic::{AtomicU32, Ordering};

/// Cumulative number of steps requested since boot
///
/// Only increases. Readers never observe a torn value. Where the target
/// has native read-modify-write atomics an increment is a single
/// `fetch_add`, so even concurrent writers never lose a tick. Without them
/// (thumbv6m) `fetch_add` would take the global critical section that the
/// run loops also use; there the time base is the only writer and an
/// increment is a plain load and store. The counter wraps after `u32::MAX`
/// steps (about 120 years at 68 steps per minute).
#[derive(Debug)]
pub struct PositionTarget {
    steps: AtomicU32,
}

impl Default for PositionTarget {
    fn default() -> Self {
        Self::new(0)
    }
}

impl PositionTarget {
    /// Create a target starting at `initial` steps
    pub const fn new(initial: u32) -> Self {
        Self {
            steps: AtomicU32::new(initial),
        }
    }

    /// Current target
    pub fn load(&self) -> u32 {
        self.steps.load(Ordering::Acquire)
    }

    /// Add `steps` to the target, returning the new value
    #[cfg(target_has_atomic = "32")]
    pub fn advance(&self, steps: u32) -> u32 {
        self.steps
            .fetch_add(steps, Ordering::AcqRel)
            .wrapping_add(steps)
    }

    /// Add `steps` to the target, returning the new value
    ///
    /// Single writer only.
    #[cfg(not(target_has_atomic = "32"))]
    pub fn advance(&self, steps: u32) -> u32 {
        let next = self.steps.load(Ordering::Relaxed).wrapping_add(steps);
        self.steps.store(next, Ordering::Release);
        next
    }
}
