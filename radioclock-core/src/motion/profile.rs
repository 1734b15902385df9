//! Trapezoidal step planner
//!
//! Plans the clock hand's motion one step at a time. Velocity is tracked
//! as its square at step boundaries, in (millisteps/s)², so the profile is
//! exact integer arithmetic:
//!
//! - accelerating adds `2a` to v² per step (constant acceleration over one
//!   step of distance)
//! - the exit velocity of a step is capped so that v² never exceeds
//!   `2a * remaining`; the hand can always stop in the distance left and
//!   reaches the target with zero velocity
//! - a step takes `2 / (v_entry + v_exit)` seconds, the exact duration of
//!   constant acceleration between the two boundary velocities
//!
//! Because the state is just the boundary velocity, a target that grows
//! mid-move simply raises the cap on the next step; the profile never
//! restarts from rest.

/// Default maximum speed in steps per second
pub const DEFAULT_MAX_SPEED: u32 = 800;

/// Default maximum acceleration in steps per second squared
pub const DEFAULT_MAX_ACCELERATION: u32 = 800;

/// Fixed-point scale of velocities (millisteps per second)
const MILLI: u64 = 1_000;

/// Microseconds per second
const MICROS: u64 = 1_000_000;

/// Speed and acceleration limits of the hand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionProfile {
    /// Maximum speed in steps per second
    pub max_speed: u32,
    /// Maximum acceleration in steps per second squared
    pub max_acceleration: u32,
}

impl Default for MotionProfile {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SPEED, DEFAULT_MAX_ACCELERATION)
    }
}

impl MotionProfile {
    /// Create a profile; zero limits are raised to one
    pub const fn new(max_speed: u32, max_acceleration: u32) -> Self {
        Self {
            max_speed: if max_speed == 0 { 1 } else { max_speed },
            max_acceleration: if max_acceleration == 0 {
                1
            } else {
                max_acceleration
            },
        }
    }

    /// Square of the speed limit in (millisteps/s)²
    fn max_speed_sq(&self) -> u64 {
        let v = u64::from(self.max_speed) * MILLI;
        v.saturating_mul(v)
    }

    /// Change in v² over one step at full acceleration
    fn accel_term(&self) -> u64 {
        2 * u64::from(self.max_acceleration) * MILLI * MILLI
    }

    /// Shortest allowed step, in microseconds
    pub fn min_interval_us(&self) -> u32 {
        MICROS.div_ceil(u64::from(self.max_speed)) as u32
    }
}

/// One planned step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlannedStep {
    /// Time from the previous step to this one, in microseconds
    pub interval_us: u32,
    /// v² at the end of the step, in (millisteps/s)²
    pub exit_speed_sq: u64,
}

impl PlannedStep {
    /// Speed at the end of the step in steps per second
    pub fn exit_speed(&self) -> u32 {
        (self.exit_speed_sq.isqrt() / MILLI) as u32
    }
}

/// Step-by-step trapezoidal profile
#[derive(Debug, Clone)]
pub struct StepPlanner {
    profile: MotionProfile,
    /// v² at the last step boundary
    speed_sq: u64,
}

impl StepPlanner {
    /// Create a planner at rest
    pub fn new(profile: MotionProfile) -> Self {
        Self {
            profile,
            speed_sq: 0,
        }
    }

    /// Limits this planner was built with
    pub fn profile(&self) -> MotionProfile {
        self.profile
    }

    /// v² at the last step boundary, in (millisteps/s)²
    pub fn speed_sq(&self) -> u64 {
        self.speed_sq
    }

    /// Current speed in steps per second (rounded down)
    pub fn speed(&self) -> u32 {
        (self.speed_sq.isqrt() / MILLI) as u32
    }

    /// Check if the hand is at rest
    pub fn is_at_rest(&self) -> bool {
        self.speed_sq == 0
    }

    /// Plan the next step with `remaining` steps left to the target
    ///
    /// Returns `None` when there is nothing left to do. The plan is not
    /// applied until [`commit`](Self::commit) is called.
    pub fn plan(&self, remaining: u32) -> Option<PlannedStep> {
        if remaining == 0 {
            return None;
        }

        let accel = self.profile.accel_term();
        let stop_limit = accel.saturating_mul(u64::from(remaining - 1));
        let exit_speed_sq = self
            .speed_sq
            .saturating_add(accel)
            .min(self.profile.max_speed_sq())
            .min(stop_limit);

        let entry = self.speed_sq.isqrt();
        let exit = exit_speed_sq.isqrt();

        let interval_us = if entry + exit == 0 {
            // Lone step from rest: accelerate over the first half,
            // decelerate over the second
            2 * MICROS / u64::from(self.profile.max_acceleration).isqrt().max(1)
        } else {
            2 * MICROS * MILLI / (entry + exit)
        };

        let interval_us = interval_us
            .max(u64::from(self.profile.min_interval_us()))
            .min(u64::from(u32::MAX)) as u32;

        Some(PlannedStep {
            interval_us,
            exit_speed_sq,
        })
    }

    /// Apply a step previously returned by [`plan`](Self::plan)
    pub fn commit(&mut self, step: PlannedStep) {
        self.speed_sq = step.exit_speed_sq;
    }
}
