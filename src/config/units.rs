//! Unit types for physical quantities.
//!
//! Type-safe wrappers for step rates, accelerations and timer durations so
//! that configuration values cannot be mixed up.

use serde::Deserialize;

/// Microseconds per second, the numerator of every period calculation.
pub const MICROS_PER_SEC: u32 = 1_000_000;

/// Step rate in steps per second (signed: the sign selects direction).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(transparent)]
pub struct StepsPerSec(pub f32);

impl StepsPerSec {
    /// Create a new StepsPerSec value.
    #[inline]
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }
}

/// Acceleration magnitude in steps per second squared.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(transparent)]
pub struct StepsPerSecSquared(pub f32);

impl StepsPerSecSquared {
    /// Create a new StepsPerSecSquared value.
    #[inline]
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }

    /// Velocity change accumulated over `period`.
    #[inline]
    pub fn over(self, period: Microseconds) -> StepsPerSec {
        StepsPerSec(self.0 * period.0 as f32 / MICROS_PER_SEC as f32)
    }
}

/// A duration in whole microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(transparent)]
pub struct Microseconds(pub u32);

impl Microseconds {
    /// Create a new Microseconds value.
    #[inline]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Duration in seconds.
    #[inline]
    pub fn as_secs_f32(self) -> f32 {
        self.0 as f32 / MICROS_PER_SEC as f32
    }

    /// Duration in seconds, double precision.
    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / MICROS_PER_SEC as f64
    }

    /// Period of one step at `steps_per_sec`. Zero is treated as one.
    #[inline]
    pub const fn per_step(steps_per_sec: u32) -> Self {
        let steps_per_sec = if steps_per_sec == 0 { 1 } else { steps_per_sec };
        Self(MICROS_PER_SEC / steps_per_sec)
    }
}
