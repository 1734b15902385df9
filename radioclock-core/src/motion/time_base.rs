//! Minute time base
//!
//! Each tick credits a fixed number of steps to the position target.
//! The tick handler runs in interrupt context: it does one atomic add and
//! nothing else.

use super::target::PositionTarget;

/// Number of steps credited per tick
///
/// Computed once from the motor's steps per revolution and the number of
/// ticks that make up one revolution of the hand. The division truncates:
/// 4096 / 60 gives 68, so one revolution only advances 4080 steps and the
/// hand falls 16 steps behind every hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepIncrement {
    steps: u32,
    steps_per_revolution: u32,
    ticks_per_revolution: u32,
}

impl StepIncrement {
    /// Derive the increment for a motor and dial
    ///
    /// `ticks_per_revolution` of zero is treated as one.
    pub const fn new(steps_per_revolution: u32, ticks_per_revolution: u32) -> Self {
        let ticks = if ticks_per_revolution == 0 {
            1
        } else {
            ticks_per_revolution
        };
        Self {
            steps: steps_per_revolution / ticks,
            steps_per_revolution,
            ticks_per_revolution: ticks,
        }
    }

    /// Steps credited per tick
    pub const fn steps(&self) -> u32 {
        self.steps
    }

    /// Ticks per revolution of the hand
    pub const fn ticks_per_revolution(&self) -> u32 {
        self.ticks_per_revolution
    }

    /// Steps lost to truncation over one full revolution
    pub const fn drift_per_revolution(&self) -> u32 {
        self.steps_per_revolution - self.steps * self.ticks_per_revolution
    }
}

/// Periodic tick handler
///
/// Holds only a shared reference to the target, so it can be moved into an
/// interrupt-priority task while the motion controller keeps reading the
/// same target from another core.
#[derive(Debug, Clone, Copy)]
pub struct TimeBase<'a> {
    target: &'a PositionTarget,
    increment: StepIncrement,
}

impl<'a> TimeBase<'a> {
    /// Create a time base feeding `target`
    pub const fn new(target: &'a PositionTarget, increment: StepIncrement) -> Self {
        Self { target, increment }
    }

    /// Handle one timer firing
    ///
    /// Returns the new target. Never blocks, never allocates.
    pub fn on_tick(&self) -> u32 {
        self.target.advance(self.increment.steps())
    }

    /// Increment applied per tick
    pub fn increment(&self) -> StepIncrement {
        self.increment
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::thread;

    #[test]
    fn test_increment_truncates() {
        let inc = StepIncrement::new(4096, 60);
        assert_eq!(inc.steps(), 68);
        assert_eq!(inc.steps() * 60, 4080);
        assert_eq!(inc.drift_per_revolution(), 16);
    }

    #[test]
    fn test_increment_exact_division_has_no_drift() {
        let inc = StepIncrement::new(2048 * 30, 60);
        assert_eq!(inc.steps(), 1024);
        assert_eq!(inc.drift_per_revolution(), 0);
    }

    #[test]
    fn test_zero_ticks_treated_as_one() {
        let inc = StepIncrement::new(200, 0);
        assert_eq!(inc.steps(), 200);
        assert_eq!(inc.ticks_per_revolution(), 1);
    }

    #[test]
    fn test_ticks_accumulate_without_motion() {
        let target = PositionTarget::new(0);
        let time_base = TimeBase::new(&target, StepIncrement::new(4096, 60));

        for n in 1..=60u32 {
            assert_eq!(time_base.on_tick(), n * 68);
        }

        // One hour of ticks: 4080 of 4096 steps, 16 short
        assert_eq!(target.load(), 4080);
        assert_eq!(4096 - target.load(), 16);
    }

    #[test]
    fn test_drift_accumulates_per_hour() {
        let target = PositionTarget::new(0);
        let time_base = TimeBase::new(&target, StepIncrement::new(4096, 60));

        for _ in 0..(60 * 24) {
            time_base.on_tick();
        }

        // A day of ticks falls 24 * 16 steps short of 24 revolutions
        assert_eq!(target.load(), 24 * 4096 - 24 * 16);
    }

    #[test]
    fn test_concurrent_ticks_are_not_lost() {
        const THREADS: u32 = 4;
        const TICKS: u32 = 10_000;

        let target = PositionTarget::new(0);
        let time_base = TimeBase::new(&target, StepIncrement::new(4096, 60));

        thread::scope(|s| {
            for _ in 0..THREADS {
                s.spawn(|| {
                    for _ in 0..TICKS {
                        time_base.on_tick();
                    }
                });
            }

            // Concurrent reader only ever sees multiples of 68, never decreasing
            s.spawn(|| {
                let mut last = 0;
                while last < THREADS * TICKS * 68 {
                    let now = target.load();
                    assert!(now >= last);
                    assert_eq!(now % 68, 0);
                    last = now;
                    thread::yield_now();
                }
            });
        });

        assert_eq!(target.load(), THREADS * TICKS * 68);
    }
}
