//! Battery module: pack voltage through a resistive divider into ADC1.
//!
//! Charge is a linear interpolation between the profile's empty and full
//! voltages, clamped to 0–100 %.  Low and critical crossings raise one
//! event each; the latch re-arms once the voltage recovers above the
//! corresponding threshold (fresh batteries).
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1 through the oneshot API (initialised by hw_init).
//! On host/test: reads a per-instance injected raw value.

use log::{debug, warn};

use crate::config::BatteryProfile;
use crate::drivers::hw_init;
use crate::error::BatteryError;
use crate::events::{BatteryEvent, EventQueue};

const ADC_FULL_SCALE: u32 = 4095;
const ADC_FULL_SCALE_MV: u32 = 3100;
/// Pack-to-pin ratio of the sense divider (100k / 82k).
const DIVIDER_RATIO: f32 = 2.22;
/// Anything below this is a disconnected sense line, not a battery.
const MIN_PLAUSIBLE_V: f32 = 1.0;

/// Which threshold the pack currently sits under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChargeState {
    Ok,
    Low,
    Critical,
}

pub struct BatteryModule {
    profile: BatteryProfile,
    last_voltage: Result<f32, BatteryError>,
    state: ChargeState,
    adc_channel: u32,
    #[cfg(not(target_os = "espidf"))]
    sim_raw: Option<u16>,
}

impl BatteryModule {
    pub fn new(adc_channel: u32, profile: BatteryProfile) -> Self {
        Self {
            profile,
            last_voltage: Err(BatteryError::NoMeasurement),
            state: ChargeState::Ok,
            adc_channel,
            #[cfg(not(target_os = "espidf"))]
            sim_raw: Some(0),
        }
    }

    /// Inject the next raw ADC sample.  `None` simulates an ADC failure.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_adc(&mut self, raw: Option<u16>) {
        self.sim_raw = raw;
    }

    /// Sample the pack and queue `Update` (or `Error`), followed by a
    /// level event if a threshold was newly crossed.
    pub fn measure(&mut self, queue: &mut EventQueue) {
        let Some(raw) = self.read_adc() else {
            warn!("battery: ADC read failed");
            self.last_voltage = Err(BatteryError::AdcReadFailed);
            queue.push(BatteryEvent::Error);
            return;
        };

        let pin_mv = hw_init::raw_to_mv(raw, ADC_FULL_SCALE, ADC_FULL_SCALE_MV);
        let voltage = pin_mv as f32 / 1000.0 * DIVIDER_RATIO;
        debug!("battery: raw={} -> {:.2} V", raw, voltage);

        if voltage < MIN_PLAUSIBLE_V {
            self.last_voltage = Err(BatteryError::OutOfRange);
            queue.push(BatteryEvent::Update);
            return;
        }

        self.last_voltage = Ok(voltage);
        queue.push(BatteryEvent::Update);

        let state = self.classify(voltage);
        if state > self.state {
            match state {
                ChargeState::Low => {
                    queue.push(BatteryEvent::LevelLow);
                }
                ChargeState::Critical => {
                    queue.push(BatteryEvent::LevelCritical);
                }
                ChargeState::Ok => {}
            }
        }
        self.state = state;
    }

    pub fn voltage(&self) -> Result<f32, BatteryError> {
        self.last_voltage
    }

    pub fn charge_percent(&self) -> Result<u8, BatteryError> {
        let v = self.last_voltage?;
        let span = self.profile.full_v - self.profile.empty_v;
        if span <= 0.0 {
            return Err(BatteryError::OutOfRange);
        }
        let pct = ((v - self.profile.empty_v) / span * 100.0).clamp(0.0, 100.0);
        Ok(pct.round() as u8)
    }

    pub fn charge_state(&self) -> ChargeState {
        self.state
    }

    fn classify(&self, voltage: f32) -> ChargeState {
        if voltage < self.profile.critical_v {
            ChargeState::Critical
        } else if voltage < self.profile.low_v {
            ChargeState::Low
        } else {
            ChargeState::Ok
        }
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> Option<u16> {
        hw_init::adc1_read(self.adc_channel)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> Option<u16> {
        let _ = self.adc_channel;
        self.sim_raw
    }
}
