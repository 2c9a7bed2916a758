//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! One line per event, tagged so the serial log is easy to grep.

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { device_id } => {
                info!("START | device={}", device_id);
            }
            AppEvent::LevelChanged { from, to } => {
                info!("LEVEL | {:?} -> {:?}", from, to);
            }
            AppEvent::ReadFailed(e) => {
                warn!("FAULT | co2 read failed: {}", e);
            }
            AppEvent::SensorFault { cancelled } => {
                error!("FAULT | co2 module error (beep cycle cancelled: {})", cancelled);
            }
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | co2={:.1}ppm level={:?} | V={} charge={} | frames={}/4",
                    t.co2_ppm,
                    t.level,
                    t.voltage.map_or_else(|| "-".into(), |v| format!("{v:.2}")),
                    t.charge_percent.map_or_else(|| "-".into(), |c| format!("{c}%")),
                    t.report.frames_sent(),
                );
            }
            AppEvent::Battery {
                voltage,
                charge_percent,
            } => {
                info!("BATT  | V={:?} charge={:?}", voltage, charge_percent);
            }
            AppEvent::BatteryReadFailed(e) => {
                warn!("BATT  | read failed: {}", e);
            }
            AppEvent::BatteryFault { cancelled } => {
                error!("FAULT | battery module error (beep cycle cancelled: {})", cancelled);
            }
            AppEvent::BatteryLow => {
                warn!("BATT  | level low");
            }
            AppEvent::BatteryCritical => {
                error!("BATT  | level critical");
            }
        }
    }
}
