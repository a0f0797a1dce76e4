//! Pulse generation: the interrupt-side state machine and the mainline
//! rate-setting entry point.

mod generator;
mod rate;

pub use generator::{PulseEvent, PulseGenerator, PulseTiming};
pub use rate::RateControl;
