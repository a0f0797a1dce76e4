//! State shared between the planner and the pulse interrupt.
//!
//! Every field is a word-sized atomic. The planner publishes `target_step`,
//! the signed rate and the period with Release stores and only then sets
//! `interrupts_accepted` (Release); the interrupt side loads the flag with
//! Acquire before reading anything else, so it never acts on a half-written
//! update. `current_step` has a single writer: the interrupt side.

use core::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, Ordering};

/// Atomics connecting [`Axis`](crate::axis::Axis) and
/// [`PulseGenerator`](crate::pulse::PulseGenerator).
///
/// `new` is `const` so boards can keep one in a `static`.
#[derive(Debug, Default)]
pub struct AxisShared {
    target_step: AtomicI32,
    current_step: AtomicI32,
    rate: AtomicI32,
    period_us: AtomicU32,
    interrupts_accepted: AtomicBool,
    busy: AtomicBool,
}

impl AxisShared {
    /// Create an idle block: position zero, rate zero, interrupts rejected.
    pub const fn new() -> Self {
        Self {
            target_step: AtomicI32::new(0),
            current_step: AtomicI32::new(0),
            rate: AtomicI32::new(0),
            period_us: AtomicU32::new(0),
            interrupts_accepted: AtomicBool::new(false),
            busy: AtomicBool::new(false),
        }
    }

    /// Authoritative position: pulses actually emitted.
    #[inline]
    pub fn current_step(&self) -> i32 {
        self.current_step.load(Ordering::Acquire)
    }

    /// Position the planner currently wants the generator to reach.
    #[inline]
    pub fn target_step(&self) -> i32 {
        self.target_step.load(Ordering::Acquire)
    }

    /// Signed rate last commanded, in steps/s.
    #[inline]
    pub fn rate(&self) -> i32 {
        self.rate.load(Ordering::Relaxed)
    }

    /// Programmed timer period in microseconds, 0 while parked.
    #[inline]
    pub fn period_us(&self) -> u32 {
        self.period_us.load(Ordering::Relaxed)
    }

    /// Whether pulse interrupts are currently honoured.
    #[inline]
    pub fn interrupts_accepted(&self) -> bool {
        self.interrupts_accepted.load(Ordering::Acquire)
    }

    /// Whether a pulse handler is executing right now.
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Relaxed)
    }

    /// Claim the pulse handlers. Returns `None` if one is already running.
    ///
    /// This is a non-reentrancy guard: the pulse routine must never execute
    /// concurrently with itself. It is only sound where interrupt nesting on
    /// a single core is the sole concurrency hazard.
    #[inline]
    pub fn try_enter(&self) -> Option<BusyGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| BusyGuard { shared: self })
    }

    #[inline]
    pub(crate) fn set_target_step(&self, step: i32) {
        self.target_step.store(step, Ordering::Release);
    }

    /// Move the authoritative counter by one pulse. Interrupt side only.
    #[inline]
    pub(crate) fn advance_current_step(&self, delta: i32) {
        let step = self.current_step.load(Ordering::Relaxed);
        self.current_step.store(step.wrapping_add(delta), Ordering::Release);
    }

    /// Overwrite the counter. Only valid while the timer is parked.
    #[inline]
    pub(crate) fn set_current_step(&self, step: i32) {
        self.current_step.store(step, Ordering::Release);
    }

    #[inline]
    pub(crate) fn set_rate(&self, rate: i32) {
        self.rate.store(rate, Ordering::Release);
    }

    #[inline]
    pub(crate) fn set_period_us(&self, period_us: u32) {
        self.period_us.store(period_us, Ordering::Release);
    }

    #[inline]
    pub(crate) fn accept_interrupts(&self) {
        self.interrupts_accepted.store(true, Ordering::Release);
    }

    #[inline]
    pub(crate) fn reject_interrupts(&self) {
        self.interrupts_accepted.store(false, Ordering::Release);
    }
}

/// Held while a pulse handler runs; releases the busy flag on drop.
#[derive(Debug)]
pub struct BusyGuard<'a> {
    shared: &'a AxisShared,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.shared.busy.store(false, Ordering::Release);
    }
}
