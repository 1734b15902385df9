//! Motion controller
//!
//! Owns the hand's current position and walks it toward the shared target
//! one step at a time. Each call to [`MotionController::advance`] does a
//! bounded amount of work and never waits: if the next step is not due
//! yet it returns immediately.

use super::profile::{MotionProfile, PlannedStep, StepPlanner};
use super::target::PositionTarget;
use crate::traits::StepOutput;

/// Outcome of one controller invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionStatus {
    /// Position equals target, nothing to do
    Idle,
    /// A step is scheduled but not due yet
    Moving,
    /// A step was emitted during this call
    Stepped,
}

#[derive(Debug, Clone, Copy)]
struct PendingStep {
    due_us: u64,
    plan: PlannedStep,
}

/// Converges the hand position to the shared target
///
/// Position only ever increases and never passes the target. Velocity is
/// kept across target updates, so ticks that arrive mid-move extend the
/// current move instead of restarting it.
pub struct MotionController<'a, S> {
    target: &'a PositionTarget,
    output: S,
    planner: StepPlanner,
    position: u32,
    pending: Option<PendingStep>,
}

impl<'a, S: StepOutput> MotionController<'a, S> {
    /// Create a controller at rest, positioned at the target's current value
    pub fn new(target: &'a PositionTarget, output: S, profile: MotionProfile) -> Self {
        Self {
            target,
            output,
            planner: StepPlanner::new(profile),
            position: target.load(),
            pending: None,
        }
    }

    /// Advance toward the target at time `now_us`
    ///
    /// Emits at most one step per call. Calling this repeatedly while the
    /// position equals the target changes nothing.
    pub fn advance(&mut self, now_us: u64) -> MotionStatus {
        let Some(pending) = self.pending else {
            return if self.schedule(now_us) {
                MotionStatus::Moving
            } else {
                MotionStatus::Idle
            };
        };

        if now_us < pending.due_us {
            return MotionStatus::Moving;
        }

        self.position = self.position.wrapping_add(1);
        self.output.step(self.position);
        self.planner.commit(pending.plan);
        self.pending = None;

        // Pick up any target growth since the step was planned
        self.schedule(now_us);
        MotionStatus::Stepped
    }

    /// Plan the next step if one is needed
    fn schedule(&mut self, now_us: u64) -> bool {
        let remaining = self.target.load().wrapping_sub(self.position);
        match self.planner.plan(remaining) {
            Some(plan) => {
                self.pending = Some(PendingStep {
                    due_us: now_us.saturating_add(u64::from(plan.interval_us)),
                    plan,
                });
                true
            }
            None => false,
        }
    }

    /// Current hand position in steps
    pub fn position(&self) -> u32 {
        self.position
    }

    /// Latest observed target
    pub fn target(&self) -> u32 {
        self.target.load()
    }

    /// Current speed in steps per second
    pub fn speed(&self) -> u32 {
        self.planner.speed()
    }

    /// Check if the hand is stopped at the target
    pub fn is_idle(&self) -> bool {
        self.pending.is_none()
    }

    /// Motion limits in use
    pub fn profile(&self) -> MotionProfile {
        self.planner.profile()
    }

    /// Borrow the step output
    pub fn output(&self) -> &S {
        &self.output
    }
}
