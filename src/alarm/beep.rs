//! Beep cycle controller.
//!
//! Two scheduler tasks cooperate to produce a periodic beep with no
//! blocking waits:
//!
//! ```text
//!  t=0          t=duration                t=period     t=period+duration
//!   │ buzzer ON   │ buzzer OFF               │ buzzer ON   │ buzzer OFF
//!   ▼             ▼                          ▼             ▼
//!   ████████████████░░░░░░░░░░░░░░░░░░░░░░░░░████████████████░░░░░░ ...
//!   └ start()     └ buzzer-off task          └ next-beep task (re-arms
//!                                              itself one period after
//!                                              its own due tick)
//! ```
//!
//! Cancelling parks the next-beep task and plans the buzzer-off task for
//! "now", so the output is guaranteed to drop even mid-beep.  A next-beep
//! firing that races a cancellation sees `active == false` and does
//! nothing.

use log::{debug, error};

use crate::app::ports::BuzzerPort;
use crate::config::BeepTiming;
use crate::error::SchedulerError;
use crate::scheduler::{Scheduler, TICK_INFINITY, TaskId, TaskPhase};

/// Which of the two beep tasks a [`TaskId`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeepTask {
    BuzzerOff,
    NextBeep,
}

/// The pair of scheduler tasks driving the buzzer.
pub struct BeepCycle {
    buzzer_off_task: TaskId,
    next_beep_task: TaskId,
    timing: BeepTiming,
    /// Beeps started since boot (diagnostics only).
    beeps: u32,
}

impl BeepCycle {
    /// Register both tasks, parked.
    pub fn register(sched: &mut Scheduler, timing: BeepTiming) -> Result<Self, SchedulerError> {
        let buzzer_off_task = sched.register("buzzer-off", TICK_INFINITY)?;
        let next_beep_task = sched.register("next-beep", TICK_INFINITY)?;
        Ok(Self {
            buzzer_off_task,
            next_beep_task,
            timing,
            beeps: 0,
        })
    }

    /// Begin a cycle: beep immediately and arm both tasks.
    pub fn start(
        &mut self,
        sched: &mut Scheduler,
        buzzer: &mut impl BuzzerPort,
    ) -> Result<(), SchedulerError> {
        self.beep(sched, buzzer)?;
        sched.plan_relative(self.next_beep_task, self.timing.period_ms)
    }

    /// Stop the cycle: buzzer off now, buzzer-off task planned now,
    /// next-beep task parked.  Idempotent.
    pub fn cancel(
        &mut self,
        sched: &mut Scheduler,
        buzzer: &mut impl BuzzerPort,
    ) -> Result<(), SchedulerError> {
        buzzer.set_buzzer(false);
        sched.plan_now(self.buzzer_off_task)?;
        sched.park(self.next_beep_task)
    }

    /// Dispatch a due task.  Returns `None` when `task` is not one of ours.
    ///
    /// `active` is the owner's `dangerous_active` flag at the time of firing.
    pub fn run(
        &mut self,
        task: TaskId,
        active: bool,
        sched: &mut Scheduler,
        buzzer: &mut impl BuzzerPort,
    ) -> Option<BeepTask> {
        let kind = self.kind_of(task)?;
        match kind {
            BeepTask::BuzzerOff => buzzer.set_buzzer(false),
            BeepTask::NextBeep => {
                if active {
                    if let Err(e) = self.next_beep(sched, buzzer) {
                        error!("Beep: re-arm failed: {}", e);
                    }
                } else {
                    debug!("Beep: next-beep fired after cancellation, ignored");
                }
            }
        }
        Some(kind)
    }

    /// Map a task handle to its role.
    pub fn kind_of(&self, task: TaskId) -> Option<BeepTask> {
        if task == self.buzzer_off_task {
            Some(BeepTask::BuzzerOff)
        } else if task == self.next_beep_task {
            Some(BeepTask::NextBeep)
        } else {
            None
        }
    }

    pub fn buzzer_off_task(&self) -> TaskId {
        self.buzzer_off_task
    }

    pub fn next_beep_task(&self) -> TaskId {
        self.next_beep_task
    }

    /// Phase of the next-beep task; `Parked` means no cycle is running.
    pub fn next_beep_phase(&self, sched: &Scheduler) -> Result<TaskPhase, SchedulerError> {
        sched.phase(self.next_beep_task)
    }

    pub fn timing(&self) -> BeepTiming {
        self.timing
    }

    /// Beeps started since boot.
    pub fn beeps(&self) -> u32 {
        self.beeps
    }

    // ── Internal ──────────────────────────────────────────────

    fn next_beep(
        &mut self,
        sched: &mut Scheduler,
        buzzer: &mut impl BuzzerPort,
    ) -> Result<(), SchedulerError> {
        self.beep(sched, buzzer)?;
        if sched.current() == Some(self.next_beep_task) {
            sched.plan_current_relative(self.timing.period_ms);
            Ok(())
        } else {
            sched.plan_relative(self.next_beep_task, self.timing.period_ms)
        }
    }

    fn beep(
        &mut self,
        sched: &mut Scheduler,
        buzzer: &mut impl BuzzerPort,
    ) -> Result<(), SchedulerError> {
        buzzer.set_buzzer(true);
        self.beeps = self.beeps.wrapping_add(1);
        sched.plan_relative(self.buzzer_off_task, self.timing.duration_ms)
    }
}
