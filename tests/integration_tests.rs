//! Integration tests for velocity-stepper.
//!
//! These tests wire a complete axis (builder, planner, rate control, pulse
//! generator) to simulated pins and a simulated timer, and run it on a 1 µs
//! clock.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};
use embedded_hal_mock::eh1::digital::{
    Mock as PinMock, State as PinState, Transaction as PinTransaction,
};

use velocity_stepper::config::units::{Microseconds, StepsPerSec, StepsPerSecSquared};
use velocity_stepper::error::{ConfigError, Error};
use velocity_stepper::{
    parse_config, Axis, AxisBuilder, AxisParts, AxisShared, Direction, PeriodicTimer,
    PulseEvent, PulseGenerator, StepPolarity, TimerState,
};

// =============================================================================
// Simulated hardware
// =============================================================================

#[derive(Debug, Default)]
struct LevelPin {
    high: bool,
    rising_edges: u32,
    writes: u32,
}

impl ErrorType for LevelPin {
    type Error = Infallible;
}

impl OutputPin for LevelPin {
    fn set_high(&mut self) -> Result<(), Infallible> {
        if !self.high {
            self.rising_edges += 1;
        }
        self.high = true;
        self.writes += 1;
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Infallible> {
        self.high = false;
        self.writes += 1;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct SimTimer {
    period_us: u32,
    running: bool,
    reloads: u32,
}

impl PeriodicTimer for SimTimer {
    fn pause(&mut self) {
        self.running = false;
    }

    fn resume(&mut self) {
        self.running = true;
    }

    fn set_period_us(&mut self, period_us: u32) {
        self.period_us = period_us;
    }

    fn force_reload(&mut self) {
        self.reloads += 1;
    }
}

/// Runs the mainline loop and the timer interrupt on a shared 1 µs clock and
/// checks pulse timing as it goes.
struct Bench<'a> {
    axis: Axis<'a, SimTimer>,
    generator: PulseGenerator<'a, LevelPin, LevelPin>,
    now: u64,
    next_fire: Option<u64>,
    seen_reloads: u32,
    pulse_started: Option<u64>,
    last_release: Option<u64>,
    min_width_us: u64,
}

impl<'a> Bench<'a> {
    fn new(parts: AxisParts<'a, LevelPin, LevelPin, SimTimer>, min_width_us: u64) -> Self {
        Self {
            axis: parts.axis,
            generator: parts.generator,
            now: 0,
            next_fire: None,
            seen_reloads: 0,
            pulse_started: None,
            last_release: None,
            min_width_us,
        }
    }

    fn run_for(&mut self, micros: u64) {
        let end = self.now + micros;
        while self.now < end {
            self.step();
        }
    }

    fn step(&mut self) {
        let now = self.now;
        self.axis.tick(now);

        let timer = self.axis.timer();
        if !timer.running {
            self.next_fire = None;
        } else if timer.reloads != self.seen_reloads {
            self.seen_reloads = timer.reloads;
            self.next_fire = Some(now + timer.period_us as u64);
        }
        let period = timer.period_us as u64;

        if let Some(fire) = self.next_fire {
            if now >= fire {
                let event = self.generator.on_pulse_begin(now).unwrap();
                self.record(event);
                self.next_fire = Some(fire + period);
            }
        }

        let event = self.generator.on_pulse_end(now).unwrap();
        self.record(event);

        self.now += 1;
    }

    fn record(&mut self, event: PulseEvent) {
        match event {
            PulseEvent::Started(_) => {
                if let Some(released) = self.last_release {
                    assert!(
                        self.now - released >= self.min_width_us,
                        "gap of {} us at t={}",
                        self.now - released,
                        self.now
                    );
                }
                self.pulse_started = Some(self.now);
            }
            PulseEvent::Released => {
                let started = self.pulse_started.take().expect("release without start");
                assert!(
                    self.now - started >= self.min_width_us,
                    "width of {} us at t={}",
                    self.now - started,
                    self.now
                );
                self.last_release = Some(self.now);
            }
            _ => {}
        }
    }

    fn following_error(&self) -> i32 {
        self.axis.telemetry().following_error()
    }
}

fn build(shared: &AxisShared) -> AxisParts<'_, LevelPin, LevelPin, SimTimer> {
    AxisBuilder::new()
        .step_pin(LevelPin::default())
        .dir_pin(LevelPin::default())
        .timer(SimTimer::default())
        .shared(shared)
        .build()
        .unwrap()
}

// =============================================================================
// Builder and configuration
// =============================================================================

#[test]
fn test_builder_missing_pins() {
    let shared = AxisShared::new();
    let result = AxisBuilder::<LevelPin, LevelPin, SimTimer>::new()
        .timer(SimTimer::default())
        .shared(&shared)
        .build();
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::MissingResource("step_pin")))
    ));
}

#[test]
fn test_config_drives_idle_levels() {
    let config = parse_config(
        r#"
name = "feeder"
invert_direction = true
step_polarity = "active_low"
acceleration_steps_per_sec2 = 4000.0
"#,
    )
    .unwrap();
    assert_eq!(config.step_polarity, StepPolarity::ActiveLow);

    let shared = AxisShared::new();
    let parts = AxisBuilder::new()
        .from_config(&config)
        .step_pin(LevelPin::default())
        .dir_pin(LevelPin::default())
        .timer(SimTimer::default())
        .shared(&shared)
        .build()
        .unwrap();

    assert_eq!(parts.axis.name(), "feeder");
    assert_eq!(parts.axis.acceleration(), StepsPerSecSquared(4000.0));

    let (step, dir) = parts.generator.release();
    // active-low step idles high, inverted forward is low
    assert!(step.high);
    assert!(!dir.high);
}

#[test]
fn test_config_rejects_zero_pulse_width() {
    let result = parse_config("min_pulse_width_us = 0");
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidPulseWidth(0)))
    ));
}

// =============================================================================
// Exact pin sequence
// =============================================================================

#[test]
fn test_single_pulse_pin_sequence() {
    let step = PinMock::new(&[
        PinTransaction::set(PinState::Low),
        PinTransaction::set(PinState::High),
        PinTransaction::set(PinState::Low),
    ]);
    let dir = PinMock::new(&[PinTransaction::set(PinState::High)]);

    let shared = AxisShared::new();
    let AxisParts {
        mut axis,
        mut generator,
    } = AxisBuilder::new()
        .step_pin(step)
        .dir_pin(dir)
        .timer(SimTimer::default())
        .shared(&shared)
        .acceleration(StepsPerSecSquared(100_000.0))
        .build()
        .unwrap();

    axis.set_target_velocity(400.0);
    let out = axis.tick(10_000).unwrap();
    assert_eq!(out.target_step, 4);
    assert_eq!(axis.timer_state(), TimerState::Running { period_us: 2500 });

    assert_eq!(
        generator.on_pulse_begin(12_500).unwrap(),
        PulseEvent::Started(Direction::Forward)
    );
    assert_eq!(generator.on_pulse_end(12_501).unwrap(), PulseEvent::Holding);
    assert_eq!(generator.on_pulse_end(12_503).unwrap(), PulseEvent::Released);
    assert_eq!(shared.current_step(), 1);

    let (mut step, mut dir) = generator.release();
    step.done();
    dir.done();
}

// =============================================================================
// Closed-loop simulation
// =============================================================================

#[test]
fn test_cruise_tracks_planner() {
    let shared = AxisShared::new();
    let mut bench = Bench::new(build(&shared), 3);

    bench.axis.set_acceleration(4000.0);
    bench.axis.set_target_velocity(800.0);

    // ramp is 20 planner ticks
    bench.run_for(500_000);
    assert_eq!(bench.axis.current_velocity(), StepsPerSec(800.0));
    let at_half = shared.current_step();

    let mut worst = 0;
    for _ in 0..500 {
        bench.run_for(1_000);
        worst = worst.max(bench.following_error().abs());
    }
    let emitted = shared.current_step() - at_half;

    assert!((390..=410).contains(&emitted), "emitted {emitted}");
    assert!(worst <= 10, "following error reached {worst}");
    assert!(bench.generator.direction() == Some(Direction::Forward));

    let (step, _) = bench.generator.release();
    assert_eq!(step.rising_edges as i32, shared.current_step());
}

#[test]
fn test_slow_cruise_still_steps() {
    let shared = AxisShared::new();
    let mut bench = Bench::new(build(&shared), 3);

    // slower than one step per planner period
    bench.axis.set_acceleration(100_000.0);
    bench.axis.set_target_velocity(50.0);
    bench.run_for(2_000_000);

    let emitted = shared.current_step();
    assert!((90..=100).contains(&emitted), "emitted {emitted}");
    assert!(bench.following_error().abs() <= 2);
}

#[test]
fn test_decelerate_to_rest_parks_timer() {
    let shared = AxisShared::new();
    let mut bench = Bench::new(build(&shared), 3);

    bench.axis.set_acceleration(4000.0);
    bench.axis.set_target_velocity(800.0);
    bench.run_for(400_000);

    bench.axis.set_target_velocity(0.0);
    bench.run_for(400_000);

    assert_eq!(bench.axis.current_velocity().value(), 0.0);
    assert!(bench.axis.timer_state().is_parked());
    assert!(!shared.interrupts_accepted());

    let lag = bench.following_error();
    assert!((0..=5).contains(&lag), "lag {lag}");

    // nothing moves while parked
    let parked_at = shared.current_step();
    bench.run_for(100_000);
    assert_eq!(shared.current_step(), parked_at);
    assert!(bench.generator.is_full_stepped());
}

#[test]
fn test_reversal_switches_direction_once() {
    let shared = AxisShared::new();
    let mut bench = Bench::new(build(&shared), 3);

    bench.axis.set_acceleration(8000.0);
    bench.axis.set_target_velocity(400.0);
    bench.run_for(300_000);
    let peak = shared.current_step();
    assert!(peak > 0);

    bench.axis.set_target_velocity(-400.0);
    bench.run_for(600_000);

    assert!(shared.current_step() < peak);
    assert_eq!(bench.generator.direction(), Some(Direction::Reverse));

    let (_, dir) = bench.generator.release();
    // init writes forward, reversal writes reverse
    assert_eq!(dir.writes, 2);
    assert!(!dir.high);
}

#[test]
fn test_fast_stop_completes_asserted_pulse() {
    let shared = AxisShared::new();
    let AxisParts {
        mut axis,
        mut generator,
    } = build(&shared);

    axis.set_acceleration(100_000.0);
    axis.set_target_velocity(400.0);
    axis.tick(10_000);

    assert!(matches!(
        generator.on_pulse_begin(12_500).unwrap(),
        PulseEvent::Started(_)
    ));
    axis.fast_stop();

    assert_eq!(generator.on_pulse_begin(12_501).unwrap(), PulseEvent::Ignored);
    assert_eq!(generator.on_pulse_end(12_504).unwrap(), PulseEvent::Released);
    assert_eq!(generator.on_pulse_end(12_600).unwrap(), PulseEvent::NoOp);

    assert_eq!(shared.current_step(), 1);
    assert_eq!(shared.target_step(), 1);
    assert_eq!(axis.timer_state(), TimerState::Parked);

    let (step, _) = generator.release();
    assert!(!step.high);
    assert_eq!(step.rising_edges, 1);
}

#[test]
fn test_nested_entry_is_dropped() {
    let shared = AxisShared::new();
    let AxisParts {
        mut axis,
        mut generator,
    } = build(&shared);

    axis.set_acceleration(100_000.0);
    axis.set_target_velocity(400.0);
    axis.tick(10_000);

    {
        let _held = shared.try_enter().unwrap();
        assert_eq!(generator.on_pulse_begin(12_500).unwrap(), PulseEvent::Busy);
        assert_eq!(generator.on_pulse_end(12_500).unwrap(), PulseEvent::Busy);
    }

    assert_eq!(shared.current_step(), 0);
    assert!(matches!(
        generator.on_pulse_begin(12_501).unwrap(),
        PulseEvent::Started(_)
    ));
}

#[test]
fn test_min_timer_period_caps_rate() {
    let shared = AxisShared::new();
    let parts = AxisBuilder::new()
        .step_pin(LevelPin::default())
        .dir_pin(LevelPin::default())
        .timer(SimTimer::default())
        .shared(&shared)
        .min_timer_period(Microseconds(50))
        .acceleration(StepsPerSecSquared(10_000_000.0))
        .build()
        .unwrap();
    let mut axis = parts.axis;

    axis.set_target_velocity(100_000.0);
    axis.tick(10_000);

    assert_eq!(axis.timer_state(), TimerState::Running { period_us: 50 });
    assert_eq!(axis.timer().period_us, 50);
}

#[test]
fn test_max_velocity_clamps_command() {
    let shared = AxisShared::new();
    let parts = AxisBuilder::new()
        .step_pin(LevelPin::default())
        .dir_pin(LevelPin::default())
        .timer(SimTimer::default())
        .shared(&shared)
        .max_velocity(StepsPerSec(250.0))
        .build()
        .unwrap();
    let mut axis = parts.axis;

    axis.set_target_velocity(-1000.0);
    assert_eq!(axis.target_velocity(), StepsPerSec(-250.0));
}
