//! Axis: the mainline side of a velocity-commanded stepper.
//!
//! An axis is split in two halves that share an [`AxisShared`](crate::AxisShared)
//! block: [`Axis`] runs the planner and owns the step timer, while the
//! [`PulseGenerator`](crate::pulse::PulseGenerator) lives in the timer
//! interrupt and owns the pins.

mod builder;
mod controller;
mod telemetry;

pub use builder::{AxisBuilder, AxisParts};
pub use controller::Axis;
pub use telemetry::Telemetry;
