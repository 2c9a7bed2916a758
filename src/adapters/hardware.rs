//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`], the LED and buzzer drivers and the radio,
//! exposing them through the port traits so the service can take the
//! whole board as one `&mut`.  This is the only module in the system that
//! touches actual hardware.  On non-espidf targets, the underlying
//! drivers use cfg-gated simulation stubs.

use embedded_hal::digital::OutputPin;

use crate::adapters::radio::{FrameTransport, Radio};
use crate::app::ports::{
    BatteryPort, BuzzerPort, IndicatorPort, LedMode, RadioPort, SensorPort,
};
use crate::drivers::buzzer::Buzzer;
use crate::drivers::status_led::StatusLed;
use crate::error::{BatteryError, RadioError, SensorError};
use crate::events::EventQueue;
use crate::sensors::SensorHub;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<L: OutputPin, B: OutputPin, T: FrameTransport> {
    sensors: SensorHub,
    led: StatusLed<L>,
    buzzer: Buzzer<B>,
    radio: Radio<T>,
}

impl<L: OutputPin, B: OutputPin, T: FrameTransport> HardwareAdapter<L, B, T> {
    pub fn new(sensors: SensorHub, led: StatusLed<L>, buzzer: Buzzer<B>, radio: Radio<T>) -> Self {
        Self {
            sensors,
            led,
            buzzer,
            radio,
        }
    }

    /// Sample both modules; their events land in `queue`.
    pub fn measure(&mut self, queue: &mut EventQueue) {
        self.sensors.measure_all(queue);
    }

    /// Advance the LED waveform.
    pub fn tick_led(&mut self, delta_ms: u32) {
        self.led.tick(delta_ms);
    }

    pub fn sensors_mut(&mut self) -> &mut SensorHub {
        &mut self.sensors
    }

    pub fn led(&self) -> &StatusLed<L> {
        &self.led
    }

    pub fn buzzer(&self) -> &Buzzer<B> {
        &self.buzzer
    }

    pub fn radio(&self) -> &Radio<T> {
        &self.radio
    }

    pub fn radio_mut(&mut self) -> &mut Radio<T> {
        &mut self.radio
    }
}

// ── Read-side ports ───────────────────────────────────────────

impl<L: OutputPin, B: OutputPin, T: FrameTransport> SensorPort for HardwareAdapter<L, B, T> {
    fn concentration_ppm(&mut self) -> Result<f32, SensorError> {
        self.sensors.co2.concentration_ppm()
    }
}

impl<L: OutputPin, B: OutputPin, T: FrameTransport> BatteryPort for HardwareAdapter<L, B, T> {
    fn voltage(&mut self) -> Result<f32, BatteryError> {
        self.sensors.battery.voltage()
    }

    fn charge_percent(&mut self) -> Result<u8, BatteryError> {
        self.sensors.battery.charge_percent()
    }
}

// ── Write-side ports ──────────────────────────────────────────

impl<L: OutputPin, B: OutputPin, T: FrameTransport> IndicatorPort for HardwareAdapter<L, B, T> {
    fn set_led_mode(&mut self, mode: LedMode) {
        self.led.set_mode(mode);
        // Reflect the new mode immediately rather than on the next tick.
        self.led.tick(0);
    }
}

impl<L: OutputPin, B: OutputPin, T: FrameTransport> BuzzerPort for HardwareAdapter<L, B, T> {
    fn set_buzzer(&mut self, on: bool) {
        self.buzzer.set(on);
    }
}

impl<L: OutputPin, B: OutputPin, T: FrameTransport> RadioPort for HardwareAdapter<L, B, T> {
    fn publish_float(&mut self, topic: &str, value: f32) -> Result<(), RadioError> {
        self.radio.publish_float(topic, value)
    }

    fn publish_int(&mut self, topic: &str, value: i32) -> Result<(), RadioError> {
        self.radio.publish_int(topic, value)
    }

    fn publish_str(&mut self, topic: &str, value: &str) -> Result<(), RadioError> {
        self.radio.publish_str(topic, value)
    }

    fn pairing_request(&mut self, name: &str, version: &str) -> Result<(), RadioError> {
        self.radio.pairing_request(name, version)
    }
}
