//! Timer reconfiguration protocol.

use crate::shared::AxisShared;

use super::{PeriodicTimer, TimerState};

/// Period written to the timer when parking it.
pub const PARK_PERIOD_US: u32 = 1_000_000;

/// Owns the periodic timer and serialises every change to its period.
///
/// Writing the period of a running timer can raise an interrupt against the
/// stale counter. The interlock therefore drops the software acceptance flag
/// in [`AxisShared`] before touching the hardware and raises it again only
/// after the counter has been reloaded. The pulse handlers treat that flag,
/// not the hardware enable bit, as authoritative.
pub struct TimerInterlock<'a, T: PeriodicTimer> {
    timer: T,
    shared: &'a AxisShared,
    state: TimerState,
}

impl<'a, T: PeriodicTimer> TimerInterlock<'a, T> {
    /// Take ownership of `timer`. The timer is not touched until
    /// [`park`](Self::park) or [`set_period`](Self::set_period) is called.
    pub fn new(timer: T, shared: &'a AxisShared) -> Self {
        Self {
            timer,
            shared,
            state: TimerState::Parked,
        }
    }

    /// Reprogram the timer period.
    ///
    /// 1. reject interrupts
    /// 2. pause
    /// 3. write the period
    /// 4. if `resume`: resume, force a reload, then accept interrupts
    pub fn set_period(&mut self, period_us: u32, resume: bool) {
        self.shared.reject_interrupts();
        self.timer.pause();
        self.timer.set_period_us(period_us);

        if resume {
            self.timer.resume();
            self.timer.force_reload();
            self.shared.set_period_us(period_us);
            self.state = TimerState::Running { period_us };
            self.shared.accept_interrupts();
        } else {
            self.shared.set_period_us(0);
            self.state = TimerState::Parked;
        }
    }

    /// Pause the timer with interrupts rejected. Idempotent.
    pub fn park(&mut self) {
        self.set_period(PARK_PERIOD_US, false);
    }

    /// Last programmed state.
    #[inline]
    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Shortest period the underlying timer supports.
    #[inline]
    pub fn min_period_us(&self) -> u32 {
        self.timer.min_period_us()
    }

    /// Borrow the timer.
    #[inline]
    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Park the timer and hand it back.
    pub fn release(mut self) -> T {
        self.park();
        self.timer
    }
}
