//! Interrupt-side step pulse state machine.
//!
//! A pulse is split in two halves. [`PulseGenerator::on_pulse_begin`] writes
//! the direction line, asserts the step line and moves the authoritative
//! counter one step toward the published target.
//! [`PulseGenerator::on_pulse_end`] releases the step line once it has been
//! held for the minimum width. A new pulse may only begin after the line has
//! also been released for the minimum width; a begin request arriving
//! earlier is remembered and completed by the next end call.

use embedded_hal::digital::OutputPin;

use crate::config::{AxisConfig, StepPolarity};
use crate::error::{MotorError, Result};
use crate::motion::Direction;
use crate::shared::AxisShared;

/// Outcome of one pulse handler invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PulseEvent {
    /// Interrupts are not accepted (timer parked or being reprogrammed).
    Ignored,
    /// Another handler invocation is still running; nothing was done.
    Busy,
    /// A step pulse was asserted in the given direction.
    Started(Direction),
    /// The step line was released.
    Released,
    /// Begin arrived inside the minimum gap; it will be completed by a later
    /// [`on_pulse_end`](PulseGenerator::on_pulse_end).
    Deferred,
    /// Already at the target position, no pulse needed.
    AtTarget,
    /// Step line asserted but not yet for the minimum width.
    Holding,
    /// A deferred begin is pending but the minimum gap has not elapsed.
    Waiting,
    /// Nothing to do.
    NoOp,
}

/// Pulse timing bookkeeping, owned by the interrupt context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseTiming {
    /// When the current (or last) pulse was asserted.
    pub step_trigger_us: u64,
    /// When the last pulse was released.
    pub last_step_finish_us: u64,
    /// True while no pulse is electrically asserted.
    pub full_stepped: bool,
    /// A begin request was deferred by the minimum-gap gate.
    pub waiting_new_pulse: bool,
    /// Minimum asserted and released duration of the step line.
    pub min_pulse_width_us: u64,
}

impl PulseTiming {
    /// Idle timing with the given minimum width.
    pub const fn new(min_pulse_width_us: u64) -> Self {
        Self {
            step_trigger_us: 0,
            last_step_finish_us: 0,
            full_stepped: true,
            waiting_new_pulse: false,
            min_pulse_width_us,
        }
    }

    /// The step line has been released long enough for a new pulse.
    #[inline]
    pub fn gap_elapsed(&self, now: u64) -> bool {
        now >= self.last_step_finish_us.saturating_add(self.min_pulse_width_us)
    }

    /// The step line has been asserted long enough to release.
    #[inline]
    pub fn width_elapsed(&self, now: u64) -> bool {
        now >= self.step_trigger_us.saturating_add(self.min_pulse_width_us)
    }

    /// Pull timestamps ahead of `now` back to `now` (clock rollback).
    #[inline]
    fn clamp_to(&mut self, now: u64) {
        if self.step_trigger_us > now {
            self.step_trigger_us = now;
        }
        if self.last_step_finish_us > now {
            self.last_step_finish_us = now;
        }
    }
}

/// Step/direction pulse generator.
///
/// Owns both output lines exclusively. The board layer calls
/// [`on_pulse_begin`](Self::on_pulse_begin) from the step timer interrupt
/// and [`on_pulse_end`](Self::on_pulse_end) from the same interrupt's second
/// half (or any faster periodic context). All work is O(1) and never blocks.
pub struct PulseGenerator<'a, STEP, DIR>
where
    STEP: OutputPin,
    DIR: OutputPin,
{
    step_pin: STEP,
    dir_pin: DIR,
    shared: &'a AxisShared,
    timing: PulseTiming,
    polarity: StepPolarity,
    invert_direction: bool,
    /// Last level written to the direction line.
    direction: Option<Direction>,
}

impl<'a, STEP, DIR> PulseGenerator<'a, STEP, DIR>
where
    STEP: OutputPin,
    DIR: OutputPin,
{
    /// Create a generator. Call [`init`](Self::init) before the timer runs.
    pub fn new(step_pin: STEP, dir_pin: DIR, shared: &'a AxisShared, config: &AxisConfig) -> Self {
        Self {
            step_pin,
            dir_pin,
            shared,
            timing: PulseTiming::new(config.min_pulse_width.0 as u64),
            polarity: config.step_polarity,
            invert_direction: config.invert_direction,
            direction: None,
        }
    }

    /// Drive both lines to a defined idle level and reset pulse timing.
    ///
    /// Output mode is already guaranteed by the pin types. Must not be
    /// called while the timer is running.
    pub fn init(&mut self, invert_direction: bool) -> Result<()> {
        self.invert_direction = invert_direction;
        self.timing = PulseTiming::new(self.timing.min_pulse_width_us);
        self.release_step()?;
        self.direction = None;
        self.write_direction(Direction::Forward)?;
        Ok(())
    }

    /// First half of a pulse cycle.
    pub fn on_pulse_begin(&mut self, now: u64) -> Result<PulseEvent> {
        if !self.shared.interrupts_accepted() {
            return Ok(PulseEvent::Ignored);
        }
        let Some(_guard) = self.shared.try_enter() else {
            return Ok(PulseEvent::Busy);
        };

        self.timing.clamp_to(now);

        if self.timing.full_stepped && self.timing.gap_elapsed(now) {
            self.begin_pulse(now)
        } else {
            self.timing.waiting_new_pulse = true;
            Ok(PulseEvent::Deferred)
        }
    }

    /// Second half of a pulse cycle.
    ///
    /// Releasing an asserted pulse does not depend on interrupts being
    /// accepted, so a pulse started just before the timer was parked still
    /// completes. A deferred begin is held while interrupts are rejected and
    /// served by the first end call after they are accepted again.
    pub fn on_pulse_end(&mut self, now: u64) -> Result<PulseEvent> {
        let Some(_guard) = self.shared.try_enter() else {
            return Ok(PulseEvent::Busy);
        };

        self.timing.clamp_to(now);

        if self.timing.waiting_new_pulse && self.timing.full_stepped {
            if !self.shared.interrupts_accepted() {
                return Ok(PulseEvent::Ignored);
            }
            if !self.timing.gap_elapsed(now) {
                return Ok(PulseEvent::Waiting);
            }
            self.timing.waiting_new_pulse = false;
            return self.begin_pulse(now);
        }

        if !self.timing.full_stepped {
            if !self.timing.width_elapsed(now) {
                return Ok(PulseEvent::Holding);
            }
            self.release_step()?;
            self.timing.full_stepped = true;
            self.timing.last_step_finish_us = now;
            return Ok(PulseEvent::Released);
        }

        Ok(PulseEvent::NoOp)
    }

    fn begin_pulse(&mut self, now: u64) -> Result<PulseEvent> {
        let target = self.shared.target_step();
        let current = self.shared.current_step();

        let Some(direction) = Direction::toward(target.saturating_sub(current)) else {
            return Ok(PulseEvent::AtTarget);
        };

        // direction must settle before the active edge
        self.write_direction(direction)?;
        self.assert_step()?;

        self.shared.advance_current_step(direction.sign());
        self.timing.full_stepped = false;
        self.timing.step_trigger_us = now;

        Ok(PulseEvent::Started(direction))
    }

    fn write_direction(&mut self, direction: Direction) -> Result<()> {
        if self.direction == Some(direction) {
            return Ok(());
        }

        if direction.pin_high(self.invert_direction) {
            self.dir_pin.set_high().map_err(|_| MotorError::PinError)?;
        } else {
            self.dir_pin.set_low().map_err(|_| MotorError::PinError)?;
        }

        self.direction = Some(direction);
        Ok(())
    }

    fn assert_step(&mut self) -> Result<()> {
        match self.polarity {
            StepPolarity::ActiveHigh => self.step_pin.set_high(),
            StepPolarity::ActiveLow => self.step_pin.set_low(),
        }
        .map_err(|_| MotorError::PinError)?;
        Ok(())
    }

    fn release_step(&mut self) -> Result<()> {
        match self.polarity {
            StepPolarity::ActiveHigh => self.step_pin.set_low(),
            StepPolarity::ActiveLow => self.step_pin.set_high(),
        }
        .map_err(|_| MotorError::PinError)?;
        Ok(())
    }

    /// Pulse timing snapshot.
    #[inline]
    pub fn timing(&self) -> &PulseTiming {
        &self.timing
    }

    /// True while no pulse is asserted.
    #[inline]
    pub fn is_full_stepped(&self) -> bool {
        self.timing.full_stepped
    }

    /// True while a deferred begin is pending.
    #[inline]
    pub fn is_waiting_new_pulse(&self) -> bool {
        self.timing.waiting_new_pulse
    }

    /// Last direction written to the direction line.
    #[inline]
    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    /// Hand back the pins.
    pub fn release(self) -> (STEP, DIR) {
        (self.step_pin, self.dir_pin)
    }
}
