//! Error types for velocity-stepper.
//!
//! The motion math itself never fails: zero acceleration and too-short timer
//! periods are resolved as policy clamps. Errors only come from configuration,
//! from missing hardware resources at build time, and from pin writes.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all velocity-stepper operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Motor output error
    Motor(MotorError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Planner period must be > 0 microseconds
    InvalidPlannerPeriod(u32),
    /// Minimum pulse width must be > 0 microseconds
    InvalidPulseWidth(u32),
    /// Minimum timer period must be > 0 microseconds
    InvalidTimerPeriod(u32),
    /// Acceleration must be finite and >= 0
    InvalidAcceleration(f32),
    /// Max velocity must be finite and > 0
    InvalidMaxVelocity(f32),
    /// A hardware resource was not supplied to the builder
    MissingResource(&'static str),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Motor output errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorError {
    /// Pin operation failed
    PinError,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Motor(e) => write!(f, "Motor error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidPlannerPeriod(v) => {
                write!(f, "Invalid planner period: {} us. Must be > 0", v)
            }
            ConfigError::InvalidPulseWidth(v) => {
                write!(f, "Invalid minimum pulse width: {} us. Must be > 0", v)
            }
            ConfigError::InvalidTimerPeriod(v) => {
                write!(f, "Invalid minimum timer period: {} us. Must be > 0", v)
            }
            ConfigError::InvalidAcceleration(v) => {
                write!(f, "Invalid acceleration: {}. Must be finite and >= 0", v)
            }
            ConfigError::InvalidMaxVelocity(v) => {
                write!(f, "Invalid max velocity: {}. Must be finite and > 0", v)
            }
            ConfigError::MissingResource(what) => write!(f, "{} is required", what),
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for MotorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotorError::PinError => write!(f, "GPIO pin operation failed"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<MotorError> for Error {
    fn from(e: MotorError) -> Self {
        Error::Motor(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for MotorError {}
