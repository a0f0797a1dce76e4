//! Mainline side of the pulse generator: turning a step rate into a timer
//! period.

use crate::config::units::Microseconds;
use crate::config::AxisConfig;
use crate::shared::AxisShared;
use crate::timer::{PeriodicTimer, TimerInterlock, TimerState};

/// Programs the step timer for a commanded rate.
pub struct RateControl<'a, T: PeriodicTimer> {
    interlock: TimerInterlock<'a, T>,
    shared: &'a AxisShared,
    min_period_us: u32,
}

impl<'a, T: PeriodicTimer> RateControl<'a, T> {
    /// Take ownership of the timer. The effective period floor is the larger
    /// of the configured floor and the timer's own minimum.
    pub fn new(timer: T, shared: &'a AxisShared, config: &AxisConfig) -> Self {
        let interlock = TimerInterlock::new(timer, shared);
        let min_period_us = config.min_timer_period.0.max(interlock.min_period_us()).max(1);
        Self {
            interlock,
            shared,
            min_period_us,
        }
    }

    /// Command a signed step rate in steps/s.
    ///
    /// Zero parks the timer. Otherwise the period is `1_000_000 / |rate|`
    /// microseconds, clamped up to the period floor. Reprogramming is skipped
    /// when the timer already runs at exactly that period, so a steady rate
    /// does not keep restarting the counter.
    pub fn set_rate(&mut self, rate: i32) {
        let magnitude = rate.unsigned_abs();
        self.shared.set_rate(rate);

        if magnitude == 0 {
            if !self.interlock.state().is_parked() {
                debug!("step timer parked");
            }
            self.interlock.park();
            return;
        }

        let period_us = self.period_for(magnitude);
        if self.interlock.state() == (TimerState::Running { period_us }) {
            return;
        }
        self.interlock.set_period(period_us, true);
    }

    /// Timer period for a rate magnitude, after clamping.
    pub fn period_for(&self, magnitude: u32) -> u32 {
        Microseconds::per_step(magnitude).0.max(self.min_period_us)
    }

    /// Park the timer.
    pub fn park(&mut self) {
        self.set_rate(0);
    }

    /// Last programmed timer state.
    #[inline]
    pub fn timer_state(&self) -> TimerState {
        self.interlock.state()
    }

    /// Effective minimum period.
    #[inline]
    pub fn min_period_us(&self) -> u32 {
        self.min_period_us
    }

    /// Borrow the timer.
    #[inline]
    pub fn timer(&self) -> &T {
        self.interlock.timer()
    }

    /// Park the timer and hand it back.
    pub fn release(self) -> T {
        self.interlock.release()
    }
}
