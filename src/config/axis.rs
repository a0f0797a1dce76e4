//! Axis configuration from TOML.

use heapless::String;
use serde::Deserialize;

use super::units::{Microseconds, StepsPerSec, StepsPerSecSquared};

/// Default planner cadence (10 ms).
pub const DEFAULT_PLANNER_PERIOD_US: u32 = 10_000;

/// Default minimum step pulse width.
pub const DEFAULT_MIN_PULSE_WIDTH_US: u32 = 3;

/// Default shortest timer period the axis will program.
pub const DEFAULT_MIN_TIMER_PERIOD_US: u32 = 10;

/// Electrical level that marks the step line as asserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum StepPolarity {
    /// Step pulse drives the line high.
    #[default]
    ActiveHigh,
    /// Step pulse drives the line low (opto-isolated drivers wired to VCC).
    ActiveLow,
}

/// Complete axis configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AxisConfig {
    /// Human-readable name (max 32 chars).
    #[serde(default = "default_name")]
    pub name: String<32>,

    /// Planner cadence in microseconds.
    #[serde(default = "default_planner_period", rename = "planner_period_us")]
    pub planner_period: Microseconds,

    /// Minimum time the step line stays asserted, and stays released
    /// before the next pulse.
    #[serde(default = "default_min_pulse_width", rename = "min_pulse_width_us")]
    pub min_pulse_width: Microseconds,

    /// Shortest timer period the axis will program. The effective floor is
    /// the larger of this and the timer's own minimum.
    #[serde(default = "default_min_timer_period", rename = "min_timer_period_us")]
    pub min_timer_period: Microseconds,

    /// Invert direction pin logic.
    #[serde(default)]
    pub invert_direction: bool,

    /// Step line polarity.
    #[serde(default)]
    pub step_polarity: StepPolarity,

    /// Acceleration applied at startup, in steps/s². Zero leaves the axis
    /// disarmed until a command sets one.
    #[serde(default, rename = "acceleration_steps_per_sec2")]
    pub acceleration: StepsPerSecSquared,

    /// Optional clamp on the commanded velocity magnitude, in steps/s.
    #[serde(default, rename = "max_velocity_steps_per_sec")]
    pub max_velocity: Option<StepsPerSec>,
}

fn default_name() -> String<32> {
    String::try_from("axis").unwrap_or_default()
}

fn default_planner_period() -> Microseconds {
    Microseconds(DEFAULT_PLANNER_PERIOD_US)
}

fn default_min_pulse_width() -> Microseconds {
    Microseconds(DEFAULT_MIN_PULSE_WIDTH_US)
}

fn default_min_timer_period() -> Microseconds {
    Microseconds(DEFAULT_MIN_TIMER_PERIOD_US)
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            planner_period: default_planner_period(),
            min_pulse_width: default_min_pulse_width(),
            min_timer_period: default_min_timer_period(),
            invert_direction: false,
            step_polarity: StepPolarity::default(),
            acceleration: StepsPerSecSquared::default(),
            max_velocity: None,
        }
    }
}

impl AxisConfig {
    /// Highest step rate the configured timer floor can represent.
    pub fn max_step_rate(&self) -> u32 {
        super::units::MICROS_PER_SEC / self.min_timer_period.0.max(1)
    }
}
