//! Application service: the hexagonal core.
//!
//! [`MonitorService`] owns the alarm state machine, the publisher and the
//! device identity.  Platform events go in, port calls and
//! [`AppEvent`]s come out.  All I/O flows through port traits injected at
//! call sites, so the whole service runs against mock adapters in tests.
//!
//! ```text
//!  Co2Event ──────▶ ┌──────────────────────────┐ ──▶ IndicatorPort / BuzzerPort
//!  BatteryEvent ──▶ │      MonitorService      │ ──▶ RadioPort
//!  due TaskId ────▶ │  Alarm · Beep · Publish  │ ──▶ EventSink
//!                   └──────────────────────────┘
//! ```

use log::{debug, error, info, warn};

use crate::alarm::{AlarmLevel, AlarmStateMachine};
use crate::config::MonitorConfig;
use crate::error::{Error, SensorError};
use crate::events::{BatteryEvent, Co2Event, Event};
use crate::publisher::{Measurement, MeasurementPublisher};
use crate::scheduler::{Scheduler, Tick, TaskId};

use super::events::{AppEvent, TelemetryData};
use super::ports::{
    BatteryPort, BuzzerPort, EventSink, IndicatorPort, RadioPort, SensorPort, TaskRunner,
};

/// Firmware version announced in the pairing request.
pub const FW_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Everything the service drives when handling a CO2 update.
///
/// One `&mut` carries all ports, which avoids juggling several mutable
/// borrows of the same hardware adapter.
pub trait MonitorHardware:
    SensorPort + BatteryPort + IndicatorPort + BuzzerPort + RadioPort
{
}

impl<T> MonitorHardware for T where
    T: SensorPort + BatteryPort + IndicatorPort + BuzzerPort + RadioPort
{
}

// ───────────────────────────────────────────────────────────────
// MonitorService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct MonitorService {
    config: MonitorConfig,
    alarm: AlarmStateMachine,
    publisher: MeasurementPublisher,
    device_id: heapless::String<32>,
    readings: u32,
    last_telemetry: Option<TelemetryData>,
}

impl MonitorService {
    /// Construct the service and register its scheduler tasks.
    ///
    /// Does **not** announce the device; call [`start`](Self::start) next.
    pub fn new(config: MonitorConfig, device_id: &str, sched: &mut Scheduler) -> Result<Self, Error> {
        config.validate()?;
        let mut id = heapless::String::new();
        id.push_str(device_id)
            .map_err(|_| Error::Init("device id longer than 32 bytes"))?;
        let alarm = AlarmStateMachine::new(&config, sched)?;
        Ok(Self {
            config,
            alarm,
            publisher: MeasurementPublisher::new(),
            device_id: id,
            readings: 0,
            last_telemetry: None,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Send the pairing request and report startup.
    pub fn start(&mut self, radio: &mut impl RadioPort, sink: &mut impl EventSink) {
        if let Err(e) = radio.pairing_request(&self.config.radio_name, FW_VERSION) {
            warn!("Radio: pairing request failed: {}", e);
        }
        sink.emit(&AppEvent::Started {
            device_id: self.device_id.clone(),
        });
        info!(
            "MonitorService started (device {}, fw {})",
            self.device_id, FW_VERSION
        );
    }

    // ── Event handling ────────────────────────────────────────

    /// Route one platform event.
    pub fn handle_event(
        &mut self,
        event: Event,
        sched: &mut Scheduler,
        hw: &mut impl MonitorHardware,
        sink: &mut impl EventSink,
    ) {
        match event {
            Event::Co2(e) => self.handle_co2_event(e, sched, hw, sink),
            Event::Battery(e) => self.handle_battery_event(e, sched, hw, sink),
        }
    }

    /// React to a CO2 module event: classify, drive outputs, publish.
    pub fn handle_co2_event(
        &mut self,
        event: Co2Event,
        sched: &mut Scheduler,
        hw: &mut impl MonitorHardware,
        sink: &mut impl EventSink,
    ) {
        match event {
            Co2Event::Update => match hw.concentration_ppm().and_then(plausible) {
                Ok(ppm) => self.on_valid_reading(ppm, sched, hw, sink),
                Err(e) => {
                    self.alarm.on_read_failure(hw);
                    sink.emit(&AppEvent::ReadFailed(e));
                }
            },
            Co2Event::Error => {
                let cancelled = self.alarm.on_sensor_error(sched, hw);
                sink.emit(&AppEvent::SensorFault { cancelled });
            }
        }
    }

    /// Battery events are logged and reported.  A module hard error also
    /// puts the alarm into its safe state, like a CO2 module error.
    pub fn handle_battery_event(
        &mut self,
        event: BatteryEvent,
        sched: &mut Scheduler,
        hw: &mut (impl BatteryPort + IndicatorPort + BuzzerPort),
        sink: &mut impl EventSink,
    ) {
        match event {
            BatteryEvent::Update => {
                let voltage = hw.voltage();
                let charge = hw.charge_percent();
                match (voltage, charge) {
                    (Ok(v), Ok(pct)) => debug!("Battery: {:.2} V ({} %)", v, pct),
                    (Err(e), _) | (_, Err(e)) => {
                        error!("Failed to get battery reading.");
                        sink.emit(&AppEvent::BatteryReadFailed(e));
                    }
                }
                sink.emit(&AppEvent::Battery {
                    voltage: voltage.ok(),
                    charge_percent: charge.ok(),
                });
            }
            BatteryEvent::Error => {
                error!("Battery Module Error");
                let cancelled = self.alarm.on_module_error(sched, hw);
                sink.emit(&AppEvent::BatteryFault { cancelled });
            }
            BatteryEvent::LevelLow => {
                warn!("Battery level low");
                sink.emit(&AppEvent::BatteryLow);
            }
            BatteryEvent::LevelCritical => {
                error!("Battery level critical!");
                sink.emit(&AppEvent::BatteryCritical);
            }
        }
    }

    /// Dispatch every scheduler task due at `now`.  Returns the number run.
    pub fn run_due_tasks(
        &mut self,
        now: Tick,
        sched: &mut Scheduler,
        buzzer: &mut impl BuzzerPort,
    ) -> usize {
        let mut runner = AlarmTasks {
            alarm: &mut self.alarm,
            buzzer,
        };
        sched.run_due(now, &mut runner)
    }

    // ── Queries ───────────────────────────────────────────────

    /// Last level computed from a valid reading.
    pub fn level(&self) -> Option<AlarmLevel> {
        self.alarm.level()
    }

    /// Whether the beep cycle is running.
    pub fn dangerous_active(&self) -> bool {
        self.alarm.dangerous_active()
    }

    pub fn alarm(&self) -> &AlarmStateMachine {
        &self.alarm
    }

    pub fn publisher(&self) -> &MeasurementPublisher {
        &self.publisher
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Valid readings processed since startup.
    pub fn readings(&self) -> u32 {
        self.readings
    }

    /// Snapshot of the most recent publication.
    pub fn last_telemetry(&self) -> Option<&TelemetryData> {
        self.last_telemetry.as_ref()
    }

    // ── Internal ──────────────────────────────────────────────

    fn on_valid_reading(
        &mut self,
        co2_ppm: f32,
        sched: &mut Scheduler,
        hw: &mut impl MonitorHardware,
        sink: &mut impl EventSink,
    ) {
        self.readings = self.readings.wrapping_add(1);

        let prev = self.alarm.level();
        let level = self.alarm.on_reading(co2_ppm, sched, hw);
        if prev != Some(level) {
            sink.emit(&AppEvent::LevelChanged {
                from: prev,
                to: level,
            });
        }

        let m = Measurement::collect(co2_ppm, hw);
        let report = self.publisher.publish(&m, &self.device_id, hw);
        let telemetry = TelemetryData {
            co2_ppm,
            level,
            voltage: m.voltage,
            charge_percent: m.charge_percent,
            report,
        };
        sink.emit(&AppEvent::Telemetry(telemetry.clone()));
        self.last_telemetry = Some(telemetry);
    }
}

/// A concentration must be a finite, non-negative number to count as a
/// reading.
fn plausible(ppm: f32) -> Result<f32, SensorError> {
    if ppm.is_finite() && ppm >= 0.0 {
        Ok(ppm)
    } else {
        Err(SensorError::OutOfRange)
    }
}

/// Borrows the alarm and buzzer for one scheduler pass.
struct AlarmTasks<'a, B: BuzzerPort> {
    alarm: &'a mut AlarmStateMachine,
    buzzer: &'a mut B,
}

impl<B: BuzzerPort> TaskRunner for AlarmTasks<'_, B> {
    fn run(&mut self, task: TaskId, sched: &mut Scheduler) {
        if !self.alarm.run_task(task, sched, self.buzzer) {
            warn!("Scheduler dispatched unknown task {:?}", task);
        }
    }
}
