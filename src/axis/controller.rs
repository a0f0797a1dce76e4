//! Mainline axis handle.
//!
//! Generic over the step timer. Owns the velocity planner and the timer and
//! talks to the interrupt-side [`PulseGenerator`](crate::pulse::PulseGenerator)
//! only through [`AxisShared`].

use crate::config::units::{StepsPerSec, StepsPerSecSquared};
use crate::config::AxisConfig;
use crate::motion::{MotionPlanner, PlannerOutput};
use crate::pulse::RateControl;
use crate::shared::AxisShared;
use crate::timer::{PeriodicTimer, TimerState};

use super::telemetry::Telemetry;

/// Velocity-commanded stepper axis.
///
/// Call [`tick`](Self::tick) as often as convenient from a non-blocking
/// loop; it runs the ramp at the configured planner period and reprograms
/// the step timer.
pub struct Axis<'a, T: PeriodicTimer> {
    /// Axis name for logging/debugging.
    name: heapless::String<32>,

    /// Velocity ramp and fractional position.
    planner: MotionPlanner,

    /// Step timer.
    rate: RateControl<'a, T>,

    /// State shared with the pulse interrupt.
    shared: &'a AxisShared,
}

impl<'a, T: PeriodicTimer> Axis<'a, T> {
    /// Create an axis. The timer is left untouched until [`init`](Self::init).
    pub fn new(timer: T, shared: &'a AxisShared, config: &AxisConfig) -> Self {
        Self {
            name: config.name.clone(),
            planner: MotionPlanner::from_config(config),
            rate: RateControl::new(timer, shared, config),
            shared,
        }
    }

    /// Park the timer and bring the motion state to idle at the current
    /// position.
    pub fn init(&mut self) {
        self.rate.park();
        let current = self.shared.current_step();
        self.planner.stop(current);
        self.shared.set_target_step(current);
        info!("axis {} initialised at step {}", self.name.as_str(), current);
    }

    /// Set the velocity to ramp toward, in steps/s (signed).
    pub fn set_target_velocity(&mut self, velocity: f32) {
        self.planner.set_target_velocity(velocity);
    }

    /// Set the ramp acceleration in steps/s². Zero freezes the ramp.
    pub fn set_acceleration(&mut self, acceleration: f32) {
        if acceleration == 0.0 && !self.planner.is_disarmed() {
            debug!("axis {} disarmed", self.name.as_str());
        }
        self.planner.set_acceleration(acceleration);
    }

    /// Poll the planner at `now` (microseconds, monotonic).
    ///
    /// Returns the tick output when a planner period elapsed and the axis is
    /// armed.
    pub fn tick(&mut self, now: u64) -> Option<PlannerOutput> {
        let current = self.shared.current_step();
        let output = self.planner.tick(now, current)?;
        self.apply(output);
        Some(output)
    }

    /// Run one planner step immediately, for callers that schedule the
    /// planner themselves at the configured period.
    pub fn advance(&mut self) -> Option<PlannerOutput> {
        let current = self.shared.current_step();
        let output = self.planner.advance(current)?;
        self.apply(output);
        Some(output)
    }

    fn apply(&mut self, output: PlannerOutput) {
        // target first: the interrupt reads it once the timer accepts again
        self.shared.set_target_step(output.target_step);
        self.rate.set_rate(output.rate as i32);
    }

    /// Stop issuing pulses immediately.
    ///
    /// Zeroes both velocities, parks the timer and snaps the target to the
    /// authoritative position, discarding any outstanding fractional lag. A
    /// pulse already asserted is completed by the interrupt side, not
    /// retracted.
    pub fn fast_stop(&mut self) {
        self.rate.park();
        let current = self.shared.current_step();
        self.planner.stop(current);
        self.shared.set_target_step(current);
        info!("axis {} fast stop at step {}", self.name.as_str(), current);
    }

    /// Stop the axis and redefine the current position as `step`.
    pub fn set_position(&mut self, step: i32) {
        self.rate.park();
        self.shared.set_current_step(step);
        self.planner.stop(step);
        self.shared.set_target_step(step);
    }

    /// Get the axis name.
    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Pulses actually emitted.
    #[inline]
    pub fn current_step(&self) -> i32 {
        self.shared.current_step()
    }

    /// Position the planner is steering toward.
    #[inline]
    pub fn target_step(&self) -> i32 {
        self.planner.target_step()
    }

    /// Instantaneous ramp velocity.
    #[inline]
    pub fn current_velocity(&self) -> StepsPerSec {
        self.planner.current_velocity()
    }

    /// Commanded velocity.
    #[inline]
    pub fn target_velocity(&self) -> StepsPerSec {
        self.planner.target_velocity()
    }

    /// Ramp acceleration.
    #[inline]
    pub fn acceleration(&self) -> StepsPerSecSquared {
        self.planner.acceleration()
    }

    /// Step timer state.
    #[inline]
    pub fn timer_state(&self) -> TimerState {
        self.rate.timer_state()
    }

    /// The planner.
    #[inline]
    pub fn planner(&self) -> &MotionPlanner {
        &self.planner
    }

    /// Borrow the timer.
    #[inline]
    pub fn timer(&self) -> &T {
        self.rate.timer()
    }

    /// Snapshot for diagnostics.
    pub fn telemetry(&self) -> Telemetry {
        Telemetry {
            current_step: self.shared.current_step(),
            target_step: self.planner.target_step(),
            current_velocity: self.planner.current_velocity(),
            target_velocity: self.planner.target_velocity(),
            acceleration: self.planner.acceleration(),
            rate: self.shared.rate(),
            timer: self.rate.timer_state(),
        }
    }

    /// Park the timer and hand it back.
    pub fn release(self) -> T {
        self.rate.release()
    }
}
