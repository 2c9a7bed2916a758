//! NDIR CO2 sensor module (analog output).
//!
//! The sensor drives a 0.4–2.0 V analog line proportional to the CO2
//! concentration (0–5000 ppm).  Each [`measure`](Co2Module::measure)
//! samples it once through ADC1 and caches the outcome; the concentration
//! accessor then reports the cached value or the reason there is none.
//!
//! During pre-heat the sensor holds its output near 0 V, which is below
//! the 0.4 V zero point and is reported as [`SensorError::WarmingUp`].
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1 through the oneshot API (initialised by hw_init).
//! On host/test: reads a per-instance injected raw value.

use log::{debug, warn};

use crate::drivers::hw_init;
use crate::error::SensorError;
use crate::events::{Co2Event, EventQueue};

/// Full-scale ADC reading at 12-bit resolution.
const ADC_FULL_SCALE: u32 = 4095;
/// Millivolts at full scale with 12 dB attenuation.
const ADC_FULL_SCALE_MV: u32 = 3100;
/// Readings this far above span are treated as implausible.
const OVER_RANGE_MARGIN: f32 = 1.05;

/// Two-point linear calibration of the analog output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Co2Calibration {
    /// Output voltage at 0 ppm.
    pub zero_mv: u32,
    /// Output voltage at `span_ppm`.
    pub span_mv: u32,
    pub span_ppm: f32,
}

impl Default for Co2Calibration {
    fn default() -> Self {
        Self {
            zero_mv: 400,
            span_mv: 2000,
            span_ppm: 5000.0,
        }
    }
}

pub struct Co2Module {
    cal: Co2Calibration,
    last: Result<f32, SensorError>,
    measurements: u32,
    adc_channel: u32,
    #[cfg(not(target_os = "espidf"))]
    sim_raw: Option<u16>,
}

impl Co2Module {
    pub fn new(adc_channel: u32) -> Self {
        Self {
            cal: Co2Calibration::default(),
            last: Err(SensorError::NoMeasurement),
            measurements: 0,
            adc_channel,
            #[cfg(not(target_os = "espidf"))]
            sim_raw: Some(0),
        }
    }

    pub fn set_calibration(&mut self, cal: Co2Calibration) {
        self.cal = cal;
    }

    /// Inject the next raw ADC sample.  `None` simulates an ADC failure.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_adc(&mut self, raw: Option<u16>) {
        self.sim_raw = raw;
    }

    /// Sample the sensor and queue the resulting event.
    ///
    /// An ADC failure is a module error; everything else is an update,
    /// even when the sample is unusable.
    pub fn measure(&mut self, queue: &mut EventQueue) {
        self.measurements = self.measurements.saturating_add(1);
        match self.read_adc() {
            Some(raw) => {
                self.last = self.raw_to_ppm(raw);
                debug!("co2: raw={} -> {:?}", raw, self.last);
                queue.push(Co2Event::Update);
            }
            None => {
                warn!("co2: ADC read failed");
                self.last = Err(SensorError::AdcReadFailed);
                queue.push(Co2Event::Error);
            }
        }
    }

    /// Concentration from the last measurement.
    pub fn concentration_ppm(&self) -> Result<f32, SensorError> {
        self.last
    }

    /// Measurements attempted since boot.
    pub fn measurements(&self) -> u32 {
        self.measurements
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

    fn raw_to_ppm(&self, raw: u16) -> Result<f32, SensorError> {
        let mv = hw_init::raw_to_mv(raw, ADC_FULL_SCALE, ADC_FULL_SCALE_MV);
        if mv < self.cal.zero_mv {
            return Err(SensorError::WarmingUp);
        }
        let range = self.cal.span_mv.saturating_sub(self.cal.zero_mv);
        if range == 0 {
            return Err(SensorError::OutOfRange);
        }
        let ppm = (mv - self.cal.zero_mv) as f32 / range as f32 * self.cal.span_ppm;
        if ppm > self.cal.span_ppm * OVER_RANGE_MARGIN {
            return Err(SensorError::OutOfRange);
        }
        Ok(ppm)
    }
}
