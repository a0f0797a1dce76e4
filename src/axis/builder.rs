//! Builder pattern for an axis and its pulse generator.

use embedded_hal::digital::OutputPin;

use crate::config::{validate_config, AxisConfig, StepPolarity};
use crate::config::units::{Microseconds, StepsPerSec, StepsPerSecSquared};
use crate::error::{ConfigError, Error, Result};
use crate::pulse::PulseGenerator;
use crate::shared::AxisShared;
use crate::timer::PeriodicTimer;

use super::controller::Axis;

/// The two halves of an axis: the mainline handle and the interrupt-side
/// generator.
pub struct AxisParts<'a, STEP, DIR, T>
where
    STEP: OutputPin,
    DIR: OutputPin,
    T: PeriodicTimer,
{
    /// Mainline handle: commands, planner tick, telemetry.
    pub axis: Axis<'a, T>,
    /// Interrupt-side pulse state machine.
    pub generator: PulseGenerator<'a, STEP, DIR>,
}

/// Builder wiring pins, timer and shared state into an [`AxisParts`].
pub struct AxisBuilder<'a, STEP, DIR, T>
where
    STEP: OutputPin,
    DIR: OutputPin,
    T: PeriodicTimer,
{
    step_pin: Option<STEP>,
    dir_pin: Option<DIR>,
    timer: Option<T>,
    shared: Option<&'a AxisShared>,
    config: AxisConfig,
}

impl<STEP, DIR, T> Default for AxisBuilder<'_, STEP, DIR, T>
where
    STEP: OutputPin,
    DIR: OutputPin,
    T: PeriodicTimer,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, STEP, DIR, T> AxisBuilder<'a, STEP, DIR, T>
where
    STEP: OutputPin,
    DIR: OutputPin,
    T: PeriodicTimer,
{
    /// Create a new builder with the default configuration.
    pub fn new() -> Self {
        Self {
            step_pin: None,
            dir_pin: None,
            timer: None,
            shared: None,
            config: AxisConfig::default(),
        }
    }

    /// Set the STEP pin.
    pub fn step_pin(mut self, pin: STEP) -> Self {
        self.step_pin = Some(pin);
        self
    }

    /// Set the DIR pin.
    pub fn dir_pin(mut self, pin: DIR) -> Self {
        self.dir_pin = Some(pin);
        self
    }

    /// Set the step timer.
    pub fn timer(mut self, timer: T) -> Self {
        self.timer = Some(timer);
        self
    }

    /// Set the state block shared with the pulse interrupt.
    pub fn shared(mut self, shared: &'a AxisShared) -> Self {
        self.shared = Some(shared);
        self
    }

    /// Set the axis name.
    pub fn name(mut self, name: &str) -> Self {
        if let Ok(name) = heapless::String::try_from(name) {
            self.config.name = name;
        }
        self
    }

    /// Set the planner period.
    pub fn planner_period(mut self, period: Microseconds) -> Self {
        self.config.planner_period = period;
        self
    }

    /// Set the minimum step pulse width.
    pub fn min_pulse_width(mut self, width: Microseconds) -> Self {
        self.config.min_pulse_width = width;
        self
    }

    /// Set the shortest timer period the axis may program.
    pub fn min_timer_period(mut self, period: Microseconds) -> Self {
        self.config.min_timer_period = period;
        self
    }

    /// Set direction inversion.
    pub fn invert_direction(mut self, invert: bool) -> Self {
        self.config.invert_direction = invert;
        self
    }

    /// Set step line polarity.
    pub fn step_polarity(mut self, polarity: StepPolarity) -> Self {
        self.config.step_polarity = polarity;
        self
    }

    /// Set the startup acceleration.
    pub fn acceleration(mut self, acceleration: StepsPerSecSquared) -> Self {
        self.config.acceleration = acceleration;
        self
    }

    /// Set the velocity clamp.
    pub fn max_velocity(mut self, velocity: StepsPerSec) -> Self {
        self.config.max_velocity = Some(velocity);
        self
    }

    /// Configure from an AxisConfig, replacing every setting made so far.
    pub fn from_config(mut self, config: &AxisConfig) -> Self {
        self.config = config.clone();
        self
    }

    /// Build the axis, drive both lines idle and park the timer.
    ///
    /// # Errors
    ///
    /// Returns an error if a resource is missing, the configuration is
    /// invalid, or a pin cannot be written.
    pub fn build(self) -> Result<AxisParts<'a, STEP, DIR, T>> {
        let step_pin = self.step_pin.ok_or(missing("step_pin"))?;
        let dir_pin = self.dir_pin.ok_or(missing("dir_pin"))?;
        let timer = self.timer.ok_or(missing("timer"))?;
        let shared = self.shared.ok_or(missing("shared state"))?;

        validate_config(&self.config)?;

        let mut generator = PulseGenerator::new(step_pin, dir_pin, shared, &self.config);
        let mut axis = Axis::new(timer, shared, &self.config);

        axis.init();
        generator.init(self.config.invert_direction)?;

        Ok(AxisParts { axis, generator })
    }
}

fn missing(what: &'static str) -> Error {
    Error::Config(ConfigError::MissingResource(what))
}
