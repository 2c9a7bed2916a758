//! Outbound application events.
//!
//! The [`MonitorService`](super::service::MonitorService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them: log to serial, forward
//! to a debugger, record in tests.

use crate::alarm::AlarmLevel;
use crate::error::{BatteryError, SensorError};
use crate::publisher::PublishReport;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has started (carries the device identity).
    Started { device_id: heapless::String<32> },

    /// A valid reading moved the alarm to a different level.
    LevelChanged {
        from: Option<AlarmLevel>,
        to: AlarmLevel,
    },

    /// A measurement completed but the concentration was unavailable.
    ReadFailed(SensorError),

    /// The CO2 module reported a hard error.  `cancelled` is true when a
    /// running beep cycle was stopped because of it.
    SensorFault { cancelled: bool },

    /// Telemetry went out over the radio.
    Telemetry(TelemetryData),

    /// Battery measurement summary.
    Battery {
        voltage: Option<f32>,
        charge_percent: Option<u8>,
    },

    /// A battery accessor failed after an update.
    BatteryReadFailed(BatteryError),

    /// The battery module reported a hard error.  `cancelled` is true when
    /// a running beep cycle was stopped because of it.
    BatteryFault { cancelled: bool },

    /// Battery voltage crossed the low threshold.
    BatteryLow,

    /// Battery voltage crossed the critical threshold.
    BatteryCritical,
}

/// A point-in-time telemetry snapshot, as published.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryData {
    pub co2_ppm: f32,
    pub level: AlarmLevel,
    pub voltage: Option<f32>,
    pub charge_percent: Option<u8>,
    pub report: PublishReport,
}
