//! Run flag and liveness counters shared between loops

use portable_atomic::{AtomicBool, AtomicU32, Ordering};

/// Cleared to make the run loops return
///
/// The firmware never clears it; there is no shutdown path.
#[derive(Debug)]
pub struct RunFlag {
    running: AtomicBool,
}

impl Default for RunFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl RunFlag {
    /// Create a flag in the running state
    pub const fn new() -> Self {
        Self {
            running: AtomicBool::new(true),
        }
    }

    /// Check if loops should keep going
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Ask loops to return after their current iteration
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }
}

/// Iteration counter of one loop
///
/// Wraps on overflow; only differences between readings are meaningful.
/// Only the owning loop writes it, so a plain load and store is enough and
/// no read-modify-write (a critical section on thumbv6m) is taken.
#[derive(Debug, Default)]
pub struct Heartbeat {
    count: AtomicU32,
}

impl Heartbeat {
    pub const fn new() -> Self {
        Self {
            count: AtomicU32::new(0),
        }
    }

    /// Record one iteration
    pub fn beat(&self) {
        let next = self.count.load(Ordering::Relaxed).wrapping_add(1);
        self.count.store(next, Ordering::Relaxed);
    }

    /// Iterations recorded so far
    pub fn count(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }
}

/// Stops the loops when dropped, including while a failed test unwinds
#[cfg(test)]
pub(crate) struct StopOnDrop<'a>(pub(crate) &'a RunFlag);

#[cfg(test)]
impl Drop for StopOnDrop<'_> {
    fn drop(&mut self) {
        self.0.stop();
    }
}
