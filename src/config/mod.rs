//! Configuration module for velocity-stepper.
//!
//! Provides the axis configuration, loadable from TOML files (with the `std`
//! feature) or built in code.

mod axis;
#[cfg(feature = "std")]
mod loader;
pub mod units;
mod validation;

pub use axis::{
    AxisConfig, StepPolarity, DEFAULT_MIN_PULSE_WIDTH_US, DEFAULT_MIN_TIMER_PERIOD_US,
    DEFAULT_PLANNER_PERIOD_US,
};
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

pub use units::{Microseconds, StepsPerSec, StepsPerSecSquared};
