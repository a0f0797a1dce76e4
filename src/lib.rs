//! # velocity-stepper
//!
//! Velocity-commanded step/direction stepper control with embedded-hal 1.0 support.
//!
//! ## Features
//!
//! - **Velocity ramp**: Constant-acceleration ramp toward a signed target velocity
//! - **Fractional position**: Sub-step target tracking with bounded catch-up
//! - **Interrupt-driven pulses**: Minimum-width gated STEP pulses from a periodic timer
//! - **Race-free reprogramming**: Timer period changes never fire a half-configured interrupt
//! - **no_std compatible**: Core library works without standard library
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use velocity_stepper::{AxisBuilder, AxisShared};
//!
//! static SHARED: AxisShared = AxisShared::new();
//!
//! let parts = AxisBuilder::new()
//!     .from_config(&velocity_stepper::load_config("axis.toml")?)
//!     .step_pin(step_pin)
//!     .dir_pin(dir_pin)
//!     .timer(timer)
//!     .shared(&SHARED)
//!     .build()?;
//!
//! // Hand `parts.generator` to the timer interrupt, keep `parts.axis` in the main loop.
//! let mut axis = parts.axis;
//! axis.set_acceleration(2000.0);
//! axis.set_target_velocity(800.0);
//! loop {
//!     axis.tick(clock.now_us());
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O and TOML parsing
//! - `defmt`: Enables defmt logging for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

#[cfg(all(test, not(feature = "std")))]
extern crate std;

// Logging shims; declared first so the macros are in scope for every module below
#[macro_use]
mod fmt;

// Core modules
pub mod axis;
pub mod config;
pub mod error;
pub mod motion;
pub mod pulse;
pub mod shared;
pub mod timer;

// Re-exports for ergonomic API
pub use axis::{Axis, AxisBuilder, AxisParts, Telemetry};
pub use config::{validate_config, AxisConfig, StepPolarity};
pub use error::{Error, Result};
pub use motion::{Direction, MotionPlanner, PlannerOutput};
pub use pulse::{PulseEvent, PulseGenerator, RateControl};
pub use shared::{AxisShared, BusyGuard};
pub use timer::{PeriodicTimer, TimerInterlock, TimerState};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{Microseconds, StepsPerSec, StepsPerSecSquared};
