//! Motion module for velocity-stepper.
//!
//! Provides the velocity ramp planner and its scheduling helper.

mod cadence;
mod direction;
mod planner;

pub use cadence::Cadence;
pub use direction::Direction;
pub use planner::{MotionPlanner, PlannerOutput, MAX_RATE_CORRECTION};
