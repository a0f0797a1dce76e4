//! Periodic hardware timer abstraction and the race-free reconfiguration
//! sequence used to reprogram it while its interrupt is live.

mod interlock;

pub use interlock::{TimerInterlock, PARK_PERIOD_US};

/// A peripheral that raises an interrupt every programmed period.
///
/// Implementations are thin register wrappers; the board layer routes the
/// interrupt vector to [`PulseGenerator`](crate::pulse::PulseGenerator).
/// None of these operations may block.
pub trait PeriodicTimer {
    /// Stop counting. No interrupts are raised while paused.
    fn pause(&mut self);

    /// Resume counting from the current counter value.
    fn resume(&mut self);

    /// Program the interrupt period in microseconds.
    fn set_period_us(&mut self, period_us: u32);

    /// Reset the counter so the next interrupt is a full period away, and
    /// latch any buffered period value.
    fn force_reload(&mut self);

    /// Shortest period the peripheral can represent.
    fn min_period_us(&self) -> u32 {
        1
    }
}

impl<T: PeriodicTimer + ?Sized> PeriodicTimer for &mut T {
    fn pause(&mut self) {
        T::pause(self)
    }

    fn resume(&mut self) {
        T::resume(self)
    }

    fn set_period_us(&mut self, period_us: u32) {
        T::set_period_us(self, period_us)
    }

    fn force_reload(&mut self) {
        T::force_reload(self)
    }

    fn min_period_us(&self) -> u32 {
        T::min_period_us(self)
    }
}

/// What the timer was last programmed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerState {
    /// Paused, interrupts not accepted.
    #[default]
    Parked,
    /// Counting, raising an interrupt every `period_us`.
    Running {
        /// Programmed period in microseconds.
        period_us: u32,
    },
}

impl TimerState {
    /// Whether the timer is parked.
    #[inline]
    pub fn is_parked(self) -> bool {
        self == TimerState::Parked
    }

    /// The running period, if any.
    #[inline]
    pub fn period_us(self) -> Option<u32> {
        match self {
            TimerState::Parked => None,
            TimerState::Running { period_us } => Some(period_us),
        }
    }
}
