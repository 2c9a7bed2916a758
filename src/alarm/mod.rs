//! CO2 alarm state machine.
//!
//! Maps every CO2 reading to an [`AlarmLevel`] and drives the indicator
//! LED and the [`BeepCycle`] from it:
//!
//! ```text
//!                 ppm >= ventilate            ppm > dangerous
//!   ┌────────┐ ─────────────────▶ ┌───────────┐ ──────────────▶ ┌───────────┐
//!   │ Normal │                    │ Ventilate │                 │ Dangerous │
//!   │ LED off│ ◀───────────────── │ fast blink│ ◀────────────── │ LED on    │
//!   └────────┘   ppm < ventilate  └───────────┘  ppm <= danger. │ beeping   │
//!        ▲                                                      └───────────┘
//!        └──────────────────── ppm < ventilate ─────────────────────┘
//! ```
//!
//! Levels are recomputed from scratch on every reading, with no
//! hysteresis.  Leaving `Dangerous` for any reason (lower reading, sensor
//! hard error) always cancels the beep cycle as a pair: buzzer off plus
//! next-beep parked.

pub mod beep;

use log::{debug, error, info, warn};

use crate::app::ports::{BuzzerPort, IndicatorPort, LedMode};
use crate::config::{MonitorConfig, Thresholds};
use crate::error::SchedulerError;
use crate::scheduler::{Scheduler, TaskId};

pub use beep::{BeepCycle, BeepTask};

// ---------------------------------------------------------------------------
// Alarm level
// ---------------------------------------------------------------------------

/// Alarm level derived from a single CO2 reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlarmLevel {
    Normal,
    Ventilate,
    Dangerous,
}

impl AlarmLevel {
    /// Classify `co2_ppm` against `thresholds`.
    ///
    /// `Dangerous` is strictly above the dangerous threshold, `Ventilate`
    /// is inclusive of the ventilate threshold.
    pub fn classify(co2_ppm: f32, thresholds: &Thresholds) -> Self {
        if co2_ppm > thresholds.dangerous_ppm {
            Self::Dangerous
        } else if co2_ppm >= thresholds.ventilate_ppm {
            Self::Ventilate
        } else {
            Self::Normal
        }
    }

    /// Indicator mode shown while this level is current.
    pub fn led_mode(self) -> LedMode {
        match self {
            Self::Normal => LedMode::Off,
            Self::Ventilate => LedMode::BlinkFast,
            Self::Dangerous => LedMode::On,
        }
    }
}

/// Classify against the default 800 / 1600 ppm thresholds.
pub fn classify(co2_ppm: f32) -> AlarmLevel {
    AlarmLevel::classify(co2_ppm, &Thresholds::default())
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Owned alarm state: last level, the dangerous-cycle flag and the beep
/// tasks.  Single owner; mutated only through the methods below and
/// through [`run_task`](Self::run_task) from scheduler dispatch.
pub struct AlarmStateMachine {
    thresholds: Thresholds,
    /// `None` until the first valid reading.
    level: Option<AlarmLevel>,
    /// True iff the beep cycle is running.
    dangerous_active: bool,
    beep: BeepCycle,
}

impl AlarmStateMachine {
    /// Register the beep tasks (parked) and start with no known level.
    pub fn new(config: &MonitorConfig, sched: &mut Scheduler) -> Result<Self, SchedulerError> {
        Ok(Self {
            thresholds: config.thresholds,
            level: None,
            dangerous_active: false,
            beep: BeepCycle::register(sched, config.beep)?,
        })
    }

    /// Apply a valid reading.  Returns the level it maps to.
    pub fn on_reading(
        &mut self,
        co2_ppm: f32,
        sched: &mut Scheduler,
        out: &mut (impl IndicatorPort + BuzzerPort),
    ) -> AlarmLevel {
        debug!("CO2: {:.1} ppm", co2_ppm);
        let level = AlarmLevel::classify(co2_ppm, &self.thresholds);

        match level {
            AlarmLevel::Dangerous => warn!("CO2 level dangerous!"),
            AlarmLevel::Ventilate => info!("CO2 level requires ventilation."),
            AlarmLevel::Normal => info!("CO2 level acceptable."),
        }
        out.set_led_mode(level.led_mode());

        if level == AlarmLevel::Dangerous {
            if !self.dangerous_active {
                self.dangerous_active = true;
                if let Err(e) = self.beep.start(sched, out) {
                    error!("Alarm: failed to start beep cycle: {}", e);
                }
            }
        } else {
            self.cancel_cycle(sched, out);
        }

        self.level = Some(level);
        level
    }

    /// A measurement completed but no value could be obtained.  Signals a
    /// fault on the LED; the beep state is left untouched.
    pub fn on_read_failure(&mut self, out: &mut impl IndicatorPort) {
        error!("Failed to get CO2 reading.");
        out.set_led_mode(LedMode::BlinkSlow);
    }

    /// The sensor module reported a hard error.  Returns `true` if a cycle
    /// was cancelled.
    pub fn on_sensor_error(
        &mut self,
        sched: &mut Scheduler,
        out: &mut (impl IndicatorPort + BuzzerPort),
    ) -> bool {
        error!("CO2 Module Error");
        self.on_module_error(sched, out)
    }

    /// Any module hard error: danger can no longer be confirmed, so the
    /// fault LED comes on and a running cycle is cancelled.  Returns `true`
    /// if a cycle was cancelled.
    pub fn on_module_error(
        &mut self,
        sched: &mut Scheduler,
        out: &mut (impl IndicatorPort + BuzzerPort),
    ) -> bool {
        out.set_led_mode(LedMode::BlinkSlow);
        self.cancel_cycle(sched, out)
    }

    /// Dispatch a due scheduler task.  Returns `false` if the task does not
    /// belong to the alarm.
    pub fn run_task(&mut self, task: TaskId, sched: &mut Scheduler, buzzer: &mut impl BuzzerPort) -> bool {
        self.beep
            .run(task, self.dangerous_active, sched, buzzer)
            .is_some()
    }

    /// Last level computed from a valid reading.
    pub fn level(&self) -> Option<AlarmLevel> {
        self.level
    }

    pub fn dangerous_active(&self) -> bool {
        self.dangerous_active
    }

    pub fn beep(&self) -> &BeepCycle {
        &self.beep
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    // ── Internal ──────────────────────────────────────────────

    fn cancel_cycle(&mut self, sched: &mut Scheduler, buzzer: &mut impl BuzzerPort) -> bool {
        if !self.dangerous_active {
            return false;
        }
        self.dangerous_active = false;
        if let Err(e) = self.beep.cancel(sched, buzzer) {
            error!("Alarm: failed to cancel beep cycle: {}", e);
        }
        info!("Alarm: beep cycle cancelled");
        true
    }
}
