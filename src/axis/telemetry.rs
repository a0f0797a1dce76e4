//! Read-only diagnostics snapshot.

use crate::config::units::{StepsPerSec, StepsPerSecSquared};
use crate::timer::TimerState;

/// Point-in-time view of an axis, for logging and status reporting.
///
/// Fields owned by the interrupt side are single-word loads and only
/// eventually consistent with each other.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Telemetry {
    /// Pulses actually emitted.
    pub current_step: i32,
    /// Position the planner is steering toward.
    pub target_step: i32,
    /// Instantaneous ramp velocity.
    pub current_velocity: StepsPerSec,
    /// Commanded velocity.
    pub target_velocity: StepsPerSec,
    /// Ramp acceleration.
    pub acceleration: StepsPerSecSquared,
    /// Signed step rate last sent to the generator.
    pub rate: i32,
    /// Step timer state.
    pub timer: TimerState,
}

impl Telemetry {
    /// Steps the generator still has to emit to reach the target.
    #[inline]
    pub fn following_error(&self) -> i32 {
        self.target_step.saturating_sub(self.current_step)
    }

    /// True when nothing is moving and nothing is commanded.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.current_velocity.0 == 0.0 && self.target_velocity.0 == 0.0 && self.timer.is_parked()
    }
}
