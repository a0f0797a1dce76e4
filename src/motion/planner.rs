//! Acceleration-limited velocity ramp.
//!
//! The planner is pure arithmetic: it owns the velocity state and the
//! fractional target position, and on every accepted tick produces the step
//! rate the pulse generator should run at. It never touches hardware.

use libm::{copysignf, fabs, fabsf, trunc};

use crate::config::units::{Microseconds, StepsPerSec, StepsPerSecSquared};
use crate::config::AxisConfig;

use super::cadence::Cadence;

/// Upper bound on the lag correction factor.
pub const MAX_RATE_CORRECTION: f32 = 1.2;

/// Result of one accepted planner tick.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlannerOutput {
    /// Signed step rate to command, in steps/s, after lag correction.
    pub rate: f32,
    /// Integer position the generator should move toward.
    pub target_step: i32,
    /// Lag correction factor applied to the ramp velocity (1.0 = none).
    pub correction: f32,
}

/// Velocity ramp integrator.
#[derive(Debug, Clone)]
pub struct MotionPlanner {
    cadence: Cadence,
    period: Microseconds,
    target_velocity: f32,
    current_velocity: f32,
    acceleration: f32,
    max_velocity: Option<f32>,
    /// Double precision so sub-step progress survives at large positions.
    target_step_fractional: f64,
    target_step: i32,
}

impl MotionPlanner {
    /// Create an idle planner ticking every `period`.
    pub fn new(period: Microseconds) -> Self {
        Self {
            cadence: Cadence::new(period.0 as u64),
            period,
            target_velocity: 0.0,
            current_velocity: 0.0,
            acceleration: 0.0,
            max_velocity: None,
            target_step_fractional: 0.0,
            target_step: 0,
        }
    }

    /// Create a planner from an axis configuration.
    pub fn from_config(config: &AxisConfig) -> Self {
        let mut planner = Self::new(config.planner_period);
        planner.max_velocity = config.max_velocity.map(|v| fabsf(v.0));
        planner.set_acceleration(config.acceleration.0);
        planner
    }

    /// Set the velocity to ramp toward, in steps/s. The sign selects
    /// direction. Non-finite values are ignored; magnitudes above the
    /// configured limit are clamped.
    pub fn set_target_velocity(&mut self, velocity: f32) {
        if !velocity.is_finite() {
            warning!("ignoring non-finite target velocity");
            return;
        }
        self.target_velocity = match self.max_velocity {
            Some(max) if fabsf(velocity) > max => {
                warning!("target velocity {} clamped to {}", velocity, max);
                copysignf(max, velocity)
            }
            _ => velocity,
        };
    }

    /// Set the ramp acceleration magnitude in steps/s². Zero freezes the
    /// velocity (disarmed); non-finite values are treated as zero.
    pub fn set_acceleration(&mut self, acceleration: f32) {
        self.acceleration = if acceleration.is_finite() {
            fabsf(acceleration)
        } else {
            warning!("non-finite acceleration, disarming");
            0.0
        };
    }

    /// Run one ramp step if the planner period has elapsed at `now`.
    ///
    /// `current_step` is the generator's authoritative position, used for
    /// the lag correction. Returns `None` when the period has not elapsed
    /// or the planner is disarmed.
    pub fn tick(&mut self, now: u64, current_step: i32) -> Option<PlannerOutput> {
        if !self.cadence.due(now) {
            return None;
        }
        self.advance(current_step)
    }

    /// Run one ramp step unconditionally (externally timed).
    pub fn advance(&mut self, current_step: i32) -> Option<PlannerOutput> {
        if self.acceleration == 0.0 {
            return None;
        }

        let dt = self.period.as_secs_f32();
        let increment = StepsPerSecSquared(self.acceleration).over(self.period).0;

        if fabsf(self.current_velocity - self.target_velocity) < 2.0 * increment {
            self.current_velocity = self.target_velocity;
        } else if self.current_velocity < self.target_velocity {
            self.current_velocity += increment;
        } else {
            self.current_velocity -= increment;
        }

        self.target_step_fractional += self.current_velocity as f64 * self.period.as_secs_f64();
        self.target_step = trunc(self.target_step_fractional) as i32;

        let practical = fabs(self.target_step as f64 - current_step as f64) as f32;
        let theoretical = fabsf(self.current_velocity) * dt;

        let mut correction = 1.0;
        if practical > theoretical && theoretical > 0.0 {
            correction = (practical / theoretical).clamp(1.0, MAX_RATE_CORRECTION);
        }

        Some(PlannerOutput {
            rate: self.current_velocity * correction,
            target_step: self.target_step,
            correction,
        })
    }

    /// Drop to zero velocity immediately and discard any outstanding lag by
    /// snapping the target position to `current_step`.
    pub fn stop(&mut self, current_step: i32) {
        self.target_velocity = 0.0;
        self.current_velocity = 0.0;
        self.reset_position(current_step);
    }

    /// Re-anchor the position accumulator at `step`.
    pub fn reset_position(&mut self, step: i32) {
        self.target_step = step;
        self.target_step_fractional = step as f64;
    }

    /// Velocity being ramped toward.
    #[inline]
    pub fn target_velocity(&self) -> StepsPerSec {
        StepsPerSec(self.target_velocity)
    }

    /// Instantaneous ramp velocity.
    #[inline]
    pub fn current_velocity(&self) -> StepsPerSec {
        StepsPerSec(self.current_velocity)
    }

    /// Ramp acceleration magnitude.
    #[inline]
    pub fn acceleration(&self) -> StepsPerSecSquared {
        StepsPerSecSquared(self.acceleration)
    }

    /// Integer target position from the last tick.
    #[inline]
    pub fn target_step(&self) -> i32 {
        self.target_step
    }

    /// Fractional target position.
    #[inline]
    pub fn target_step_fractional(&self) -> f64 {
        self.target_step_fractional
    }

    /// Planner period.
    #[inline]
    pub fn period(&self) -> Microseconds {
        self.period
    }

    /// True while acceleration is zero and velocity is frozen.
    #[inline]
    pub fn is_disarmed(&self) -> bool {
        self.acceleration == 0.0
    }

    /// True once the ramp has converged on its target velocity.
    #[inline]
    pub fn is_at_target(&self) -> bool {
        self.current_velocity == self.target_velocity
    }
}
