//! Fixed-interval scheduling for cooperative loops.

/// Fires at most once per `interval_us` when polled with a monotonic
/// microsecond clock.
#[derive(Debug, Clone, Copy)]
pub struct Cadence {
    interval_us: u64,
    last_us: u64,
}

impl Cadence {
    /// Create a cadence that first fires once `now >= interval_us`.
    pub const fn new(interval_us: u64) -> Self {
        Self {
            interval_us,
            last_us: 0,
        }
    }

    /// Returns `true` and restarts the interval if it has elapsed.
    ///
    /// A stored timestamp ahead of `now` (clock rollback) is pulled back to
    /// `now`, so the cadence resumes one interval later instead of stalling.
    pub fn due(&mut self, now: u64) -> bool {
        if self.last_us > now {
            self.last_us = now;
        }
        if now < self.last_us.saturating_add(self.interval_us) {
            return false;
        }
        self.last_us = now;
        true
    }

    /// Timestamp of the last accepted poll.
    #[inline]
    pub fn last(&self) -> u64 {
        self.last_us
    }
}
