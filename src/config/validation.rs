//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::AxisConfig;

/// Validate an axis configuration.
///
/// Checks:
/// - Planner period, pulse width and timer floor are non-zero
/// - Startup acceleration is finite and non-negative
/// - Velocity clamp, if present, is finite, positive and reachable with the
///   configured timer floor
pub fn validate_config(config: &AxisConfig) -> Result<()> {
    if config.planner_period.0 == 0 {
        return Err(Error::Config(ConfigError::InvalidPlannerPeriod(
            config.planner_period.0,
        )));
    }

    if config.min_pulse_width.0 == 0 {
        return Err(Error::Config(ConfigError::InvalidPulseWidth(
            config.min_pulse_width.0,
        )));
    }

    if config.min_timer_period.0 == 0 {
        return Err(Error::Config(ConfigError::InvalidTimerPeriod(
            config.min_timer_period.0,
        )));
    }

    let accel = config.acceleration.0;
    if !accel.is_finite() || accel < 0.0 {
        return Err(Error::Config(ConfigError::InvalidAcceleration(accel)));
    }

    if let Some(max) = config.max_velocity {
        if !max.0.is_finite() || max.0 <= 0.0 || max.0 > config.max_step_rate() as f32 {
            return Err(Error::Config(ConfigError::InvalidMaxVelocity(max.0)));
        }
    }

    Ok(())
}
