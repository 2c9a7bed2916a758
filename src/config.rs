//! System configuration parameters
//!
//! All tunable parameters for the CO2 monitor.  Defaults match the
//! production board; a board variant may override them with a JSON blob
//! through [`MonitorConfig::from_json_slice`].

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// CO2 concentration (ppm) at or above which ventilation is requested.
pub const VENTILATE_THRESHOLD_PPM: f32 = 800.0;
/// CO2 concentration (ppm) strictly above which the alarm sounds.
pub const DANGEROUS_THRESHOLD_PPM: f32 = 1600.0;
/// How long the buzzer stays on for one beep.
pub const BEEP_DURATION_MS: u64 = 1000;
/// Time between the starts of two consecutive beeps.
pub const BEEP_PERIOD_MS: u64 = 10_000;
/// CO2 and battery measurement interval.
pub const MEASUREMENT_INTERVAL_MS: u64 = 30_000;

/// CO2 alarm thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Inclusive lower bound of the `Ventilate` level.
    pub ventilate_ppm: f32,
    /// Exclusive lower bound of the `Dangerous` level.
    pub dangerous_ppm: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            ventilate_ppm: VENTILATE_THRESHOLD_PPM,
            dangerous_ppm: DANGEROUS_THRESHOLD_PPM,
        }
    }
}

/// Beep cycle timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeepTiming {
    pub duration_ms: u64,
    pub period_ms: u64,
}

impl Default for BeepTiming {
    fn default() -> Self {
        Self {
            duration_ms: BEEP_DURATION_MS,
            period_ms: BEEP_PERIOD_MS,
        }
    }
}

/// Voltage profile of the battery pack (4x AAA alkaline by default).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatteryProfile {
    /// Voltage reported as 0 % charge.
    pub empty_v: f32,
    /// Voltage reported as 100 % charge.
    pub full_v: f32,
    /// Below this voltage a `LevelLow` event is raised.
    pub low_v: f32,
    /// Below this voltage a `LevelCritical` event is raised.
    pub critical_v: f32,
}

impl Default for BatteryProfile {
    fn default() -> Self {
        Self {
            empty_v: 4.4,
            full_v: 6.0,
            low_v: 5.0,
            critical_v: 4.6,
        }
    }
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    // --- Alarm ---
    pub thresholds: Thresholds,
    pub beep: BeepTiming,

    // --- Timing ---
    /// Sensor and battery measurement interval (milliseconds)
    pub measurement_interval_ms: u64,

    // --- Battery ---
    pub battery: BatteryProfile,

    // --- Radio ---
    /// Name announced in the pairing request.
    pub radio_name: heapless::String<32>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        let mut radio_name = heapless::String::new();
        // Fits: 11 bytes into a 32-byte buffer.
        let _ = radio_name.push_str("co2-monitor");
        Self {
            thresholds: Thresholds::default(),
            beep: BeepTiming::default(),
            measurement_interval_ms: MEASUREMENT_INTERVAL_MS,
            battery: BatteryProfile::default(),
            radio_name,
        }
    }
}

impl MonitorConfig {
    /// Parse and validate a JSON config blob.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_slice(bytes).map_err(|_| ConfigError::Malformed)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the alarm misbehave.
    ///
    /// Invalid ranges are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.thresholds;
        if !t.ventilate_ppm.is_finite() || !t.dangerous_ppm.is_finite() || t.ventilate_ppm < 0.0 {
            return Err(ConfigError::ValidationFailed(
                "thresholds must be finite and non-negative",
            ));
        }
        if t.ventilate_ppm >= t.dangerous_ppm {
            return Err(ConfigError::ValidationFailed(
                "thresholds.ventilate_ppm must be below thresholds.dangerous_ppm",
            ));
        }
        if self.beep.duration_ms == 0 {
            return Err(ConfigError::ValidationFailed("beep.duration_ms must be > 0"));
        }
        if self.beep.duration_ms >= self.beep.period_ms {
            return Err(ConfigError::ValidationFailed(
                "beep.duration_ms must be shorter than beep.period_ms",
            ));
        }
        if self.measurement_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("measurement_interval_ms must be > 0"));
        }
        let b = &self.battery;
        if !(b.empty_v < b.critical_v && b.critical_v < b.low_v && b.low_v < b.full_v) {
            return Err(ConfigError::ValidationFailed(
                "battery profile must satisfy empty < critical < low < full",
            ));
        }
        if self.radio_name.is_empty() {
            return Err(ConfigError::ValidationFailed("radio_name must not be empty"));
        }
        Ok(())
    }
}
