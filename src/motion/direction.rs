//! Direction of travel.

/// Direction of motor motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Positive step count.
    Forward,
    /// Negative step count.
    Reverse,
}

impl Direction {
    /// Direction needed to close a signed step error, `None` when already
    /// there.
    #[inline]
    pub fn toward(delta: i32) -> Option<Self> {
        match delta {
            0 => None,
            d if d > 0 => Some(Direction::Forward),
            _ => Some(Direction::Reverse),
        }
    }

    /// Get the sign multiplier.
    #[inline]
    pub fn sign(self) -> i32 {
        match self {
            Direction::Forward => 1,
            Direction::Reverse => -1,
        }
    }

    /// Direction pin level, honouring inversion.
    #[inline]
    pub fn pin_high(self, invert: bool) -> bool {
        match self {
            Direction::Forward => !invert,
            Direction::Reverse => invert,
        }
    }
}
