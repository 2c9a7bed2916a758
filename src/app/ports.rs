//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ MonitorService (domain)
//! ```
//!
//! Driven adapters (sensor module, battery module, LED, buzzer, radio,
//! event sinks) implement these traits.  The
//! [`MonitorService`](super::service::MonitorService) consumes them via
//! generics, so the domain core never touches hardware directly.
//!
//! All read-side ports are fallible and typed: callers must decide what a
//! missing value means for them.

use crate::error::{BatteryError, RadioError, SensorError};
use crate::scheduler::{Scheduler, TaskId};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port for the CO2 sensor module.
pub trait SensorPort {
    /// Concentration from the last completed measurement, in ppm.
    ///
    /// Implementations return an error rather than a non-finite or
    /// negative value.
    fn concentration_ppm(&mut self) -> Result<f32, SensorError>;
}

/// Read-side port for the battery module.  Each accessor fails
/// independently of the other.
pub trait BatteryPort {
    /// Pack voltage from the last completed measurement.
    fn voltage(&mut self) -> Result<f32, BatteryError>;

    /// State of charge, 0–100 %.
    fn charge_percent(&mut self) -> Result<u8, BatteryError>;
}

// ───────────────────────────────────────────────────────────────
// Actuator ports (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Indicator LED modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedMode {
    Off,
    /// Solid on.
    On,
    /// Fault indication.
    BlinkSlow,
    /// Ventilation request.
    BlinkFast,
}

/// Write-side port for the indicator LED.
pub trait IndicatorPort {
    fn set_led_mode(&mut self, mode: LedMode);
}

/// Write-side port for the alarm buzzer (binary output).
pub trait BuzzerPort {
    fn set_buzzer(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Radio port (driven adapter: domain → radio link)
// ───────────────────────────────────────────────────────────────

/// Fire-and-forget telemetry publication.
///
/// `Ok(())` means the frame was handed to the transport, not that anybody
/// received it.  Retransmission policy belongs to the adapter.
pub trait RadioPort {
    fn publish_float(&mut self, topic: &str, value: f32) -> Result<(), RadioError>;

    fn publish_int(&mut self, topic: &str, value: i32) -> Result<(), RadioError>;

    fn publish_str(&mut self, topic: &str, value: &str) -> Result<(), RadioError>;

    /// Announce this node to the gateway.
    fn pairing_request(&mut self, name: &str, version: &str) -> Result<(), RadioError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Task runner (decouples scheduler from what tasks do)
// ───────────────────────────────────────────────────────────────

/// Callback trait that the scheduler invokes for every due task.
///
/// The [`Scheduler`] knows nothing about buzzers or alarms; it hands the
/// due [`TaskId`] to the runner together with itself so the runner can
/// re-plan tasks, including the one currently running.
pub trait TaskRunner {
    fn run(&mut self, task: TaskId, sched: &mut Scheduler);
}

impl<F> TaskRunner for F
where
    F: FnMut(TaskId, &mut Scheduler),
{
    fn run(&mut self, task: TaskId, sched: &mut Scheduler) {
        self(task, sched);
    }
}
