//! Unified error types for the CO2 monitor firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! top-level event loop's error handling uniform.  All variants are `Copy`
//! so they can be passed through the alarm and publisher paths without
//! allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The CO2 sensor could not be read or returned implausible data.
    Sensor(SensorError),
    /// The battery module could not be read.
    Battery(BatteryError),
    /// A radio publication failed.
    Radio(RadioError),
    /// The task scheduler rejected a request.
    Scheduler(SchedulerError),
    /// Configuration is invalid.
    Config(ConfigError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Battery(e) => write!(f, "battery: {e}"),
            Self::Radio(e) => write!(f, "radio: {e}"),
            Self::Scheduler(e) => write!(f, "scheduler: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// ADC read returned an error.
    AdcReadFailed,
    /// No measurement has completed yet.
    NoMeasurement,
    /// Reading is outside the physically plausible range.
    OutOfRange,
    /// Sensor output is still below its warm-up floor.
    WarmingUp,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdcReadFailed => write!(f, "ADC read failed"),
            Self::NoMeasurement => write!(f, "no measurement available"),
            Self::OutOfRange => write!(f, "reading out of range"),
            Self::WarmingUp => write!(f, "sensor warming up"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Battery errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryError {
    /// ADC read returned an error.
    AdcReadFailed,
    /// No measurement has completed yet.
    NoMeasurement,
    /// Voltage outside the configured battery profile.
    OutOfRange,
}

impl fmt::Display for BatteryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdcReadFailed => write!(f, "ADC read failed"),
            Self::NoMeasurement => write!(f, "no measurement available"),
            Self::OutOfRange => write!(f, "voltage out of range"),
        }
    }
}

impl From<BatteryError> for Error {
    fn from(e: BatteryError) -> Self {
        Self::Battery(e)
    }
}

// ---------------------------------------------------------------------------
// Radio errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioError {
    /// Radio stack not initialised.
    NotReady,
    /// Topic or payload does not fit in a frame.
    FrameTooLarge,
    /// Frame serialisation failed.
    Encode,
    /// A received frame could not be parsed.
    Decode,
    /// The transport refused the frame.
    SendFailed(i32),
}

impl fmt::Display for RadioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReady => write!(f, "radio not ready"),
            Self::FrameTooLarge => write!(f, "frame too large"),
            Self::Encode => write!(f, "frame encoding failed"),
            Self::Decode => write!(f, "frame decoding failed"),
            Self::SendFailed(rc) => write!(f, "send failed (rc={rc})"),
        }
    }
}

impl From<RadioError> for Error {
    fn from(e: RadioError) -> Self {
        Self::Radio(e)
    }
}

// ---------------------------------------------------------------------------
// Scheduler errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerError {
    /// Every task slot is taken.
    TableFull,
    /// The handle does not name a registered task.
    UnknownTask,
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TableFull => write!(f, "task table full"),
            Self::UnknownTask => write!(f, "unknown task handle"),
        }
    }
}

impl From<SchedulerError> for Error {
    fn from(e: SchedulerError) -> Self {
        Self::Scheduler(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from [`MonitorConfig`](crate::config::MonitorConfig) loading and
/// validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The serialised config could not be parsed.
    Malformed,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "config malformed"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
