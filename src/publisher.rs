//! Measurement publisher.
//!
//! Forwards one reading to the radio as independent topic/value frames:
//!
//! | Topic                        | Payload | Sent when                  |
//! |------------------------------|---------|----------------------------|
//! | `co2-meter/-/concentration`  | float   | always                     |
//! | `battery/-/voltage`          | float   | voltage was obtained       |
//! | `charge`                     | int     | charge was obtained        |
//! | `device-id`                  | string  | always                     |
//!
//! The receiver is stateless, so the device identity rides along with
//! every reading.  A failed frame is logged and skipped; the remaining
//! frames still go out and nothing is retried here.

use log::{info, warn};

use crate::app::ports::{BatteryPort, RadioPort};
use crate::error::RadioError;

pub const TOPIC_CO2: &str = "co2-meter/-/concentration";
pub const TOPIC_VOLTAGE: &str = "battery/-/voltage";
pub const TOPIC_CHARGE: &str = "charge";
pub const TOPIC_DEVICE_ID: &str = "device-id";

/// One reading, ready to publish.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub co2_ppm: f32,
    pub voltage: Option<f32>,
    pub charge_percent: Option<u8>,
}

impl Measurement {
    /// Pair a CO2 reading with whatever the battery module can provide.
    /// A missing battery field is a warning, never a reason to skip the
    /// reading.
    pub fn collect(co2_ppm: f32, battery: &mut impl BatteryPort) -> Self {
        let voltage = battery
            .voltage()
            .map_err(|e| warn!("Failed to get battery voltage: {}", e))
            .ok();
        let charge_percent = battery
            .charge_percent()
            .map_err(|e| warn!("Failed to get battery percentage: {}", e))
            .ok();
        Self {
            co2_ppm,
            voltage,
            charge_percent,
        }
    }
}

/// Which frames were handed to the radio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub co2: bool,
    pub voltage: bool,
    pub charge: bool,
    pub device_id: bool,
}

impl PublishReport {
    /// Number of frames that went out.
    pub fn frames_sent(&self) -> u8 {
        [self.co2, self.voltage, self.charge, self.device_id]
            .iter()
            .filter(|&&sent| sent)
            .count() as u8
    }
}

/// Stateless apart from counters kept for diagnostics.
#[derive(Debug, Default)]
pub struct MeasurementPublisher {
    frames_sent: u32,
    frames_failed: u32,
}

impl MeasurementPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `m` and the device identity.
    pub fn publish(
        &mut self,
        m: &Measurement,
        device_id: &str,
        radio: &mut impl RadioPort,
    ) -> PublishReport {
        let mut report = PublishReport {
            co2: self.track(TOPIC_CO2, radio.publish_float(TOPIC_CO2, m.co2_ppm)),
            ..PublishReport::default()
        };

        if let Some(voltage) = m.voltage {
            report.voltage = self.track(TOPIC_VOLTAGE, radio.publish_float(TOPIC_VOLTAGE, voltage));
        }
        if let Some(charge) = m.charge_percent {
            report.charge = self.track(
                TOPIC_CHARGE,
                radio.publish_int(TOPIC_CHARGE, i32::from(charge)),
            );
        }

        report.device_id = self.track(TOPIC_DEVICE_ID, radio.publish_str(TOPIC_DEVICE_ID, device_id));

        info!(
            "Published CO2: {:.1}, Voltage: {}, Charge: {}, Device ID: {}",
            m.co2_ppm,
            m.voltage.map_or(f32::NAN, |v| v),
            m.charge_percent.map_or(-1, i32::from),
            device_id
        );
        report
    }

    pub fn frames_sent(&self) -> u32 {
        self.frames_sent
    }

    pub fn frames_failed(&self) -> u32 {
        self.frames_failed
    }

    fn track(&mut self, topic: &str, result: Result<(), RadioError>) -> bool {
        match result {
            Ok(()) => {
                self.frames_sent = self.frames_sent.saturating_add(1);
                true
            }
            Err(e) => {
                self.frames_failed = self.frames_failed.saturating_add(1);
                warn!("Radio: publish '{}' failed: {}", topic, e);
                false
            }
        }
    }
}
