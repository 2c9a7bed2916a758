//! Deadline-based cooperative task scheduler.
//!
//! Tasks are registered once and then re-planned by their owners.  A task
//! with the [`TICK_INFINITY`] deadline is *parked*: it stays registered but
//! never fires until somebody arms it again.  There is no unregister and no
//! way to abort a task that has already been selected to run; owners make
//! late firings harmless by re-checking their own state.
//!
//! ```text
//!            plan_relative / plan_absolute / plan_now
//!   ┌────────┐ ───────────────────────────────────▶ ┌──────────────────┐
//!   │ Parked │                                      │ Armed{deadline}  │
//!   └────────┘ ◀─────────────────────────────────── └──────────────────┘
//!        ▲        park                                   │ deadline <= now
//!        │                                               ▼
//!        │   (not re-armed)                        ┌───────────┐
//!        └──────────────────────────────────────── │  Running  │
//!                                                  └───────────┘
//!                                  plan_current_relative ──▶ Armed
//! ```
//!
//! Dispatch is strictly one task at a time, in deadline order (ties broken
//! by registration order), on the caller's thread.  The scheduler parks a
//! task just before running it, so a task fires exactly once per arming.

use log::debug;

use crate::app::ports::TaskRunner;
use crate::error::SchedulerError;

/// Milliseconds since boot.
pub type Tick = u64;

/// Deadline of a parked task.
pub const TICK_INFINITY: Tick = Tick::MAX;

/// Maximum number of registered tasks (stack-allocated).
const MAX_TASKS: usize = 8;

/// Opaque handle returned by [`Scheduler::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u8);

impl TaskId {
    /// Slot index inside the task table.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Whether a task is waiting for a finite deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskPhase {
    /// Infinite deadline: effectively disabled until re-armed.
    Parked,
    /// Will fire once `now >= deadline`.
    Armed { deadline: Tick },
}

#[derive(Debug, Clone)]
struct TaskSlot {
    label: &'static str,
    deadline: Tick,
}

/// The currently running task and the tick it was due at.
#[derive(Debug, Clone, Copy)]
struct Running {
    task: TaskId,
    due: Tick,
}

/// The scheduler engine.
///
/// Decoupled from what tasks *do*: when a task is due, [`run_due`] hands its
/// [`TaskId`] to a [`TaskRunner`], which may re-plan any task (including the
/// running one) through the `&mut Scheduler` it receives.
///
/// [`run_due`]: Scheduler::run_due
pub struct Scheduler {
    tasks: heapless::Vec<TaskSlot, MAX_TASKS>,
    now: Tick,
    running: Option<Running>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Scheduler {
    /// Create an empty scheduler whose clock starts at `now`.
    pub fn new(now: Tick) -> Self {
        Self {
            tasks: heapless::Vec::new(),
            now,
            running: None,
        }
    }

    /// Register a task with an initial deadline (use [`TICK_INFINITY`] to
    /// register it parked).
    pub fn register(&mut self, label: &'static str, deadline: Tick) -> Result<TaskId, SchedulerError> {
        let index = self.tasks.len();
        self.tasks
            .push(TaskSlot { label, deadline })
            .map_err(|_| SchedulerError::TableFull)?;
        debug!("Scheduler: registered '{}' at slot {}", label, index);
        Ok(TaskId(index as u8))
    }

    /// Arm `task` to fire `delay` ms after the scheduler's current tick.
    pub fn plan_relative(&mut self, task: TaskId, delay: Tick) -> Result<(), SchedulerError> {
        let deadline = self.now.saturating_add(delay);
        self.set_deadline(task, deadline)
    }

    /// Arm `task` for an absolute tick.  `TICK_INFINITY` parks it.
    pub fn plan_absolute(&mut self, task: TaskId, deadline: Tick) -> Result<(), SchedulerError> {
        self.set_deadline(task, deadline)
    }

    /// Arm `task` to fire on the next dispatch pass.
    pub fn plan_now(&mut self, task: TaskId) -> Result<(), SchedulerError> {
        self.set_deadline(task, self.now)
    }

    /// Park `task` at the infinite deadline.
    pub fn park(&mut self, task: TaskId) -> Result<(), SchedulerError> {
        self.set_deadline(task, TICK_INFINITY)
    }

    /// Re-arm the *running* task `delay` ms after the tick it was due at.
    ///
    /// Anchoring on the due tick rather than the current tick keeps a
    /// self-rescheduling task free of drift from dispatch latency.  Returns
    /// the new deadline, or `None` when no task is running.
    pub fn plan_current_relative(&mut self, delay: Tick) -> Option<Tick> {
        let running = self.running?;
        let deadline = running.due.saturating_add(delay);
        self.tasks[running.task.index()].deadline = deadline;
        Some(deadline)
    }

    /// The running task, if called from inside a [`TaskRunner`].
    pub fn current(&self) -> Option<TaskId> {
        self.running.map(|r| r.task)
    }

    /// Current scheduler tick.
    pub fn now(&self) -> Tick {
        self.now
    }

    /// Parked or armed, per task.
    pub fn phase(&self, task: TaskId) -> Result<TaskPhase, SchedulerError> {
        let slot = self.tasks.get(task.index()).ok_or(SchedulerError::UnknownTask)?;
        Ok(if slot.deadline == TICK_INFINITY {
            TaskPhase::Parked
        } else {
            TaskPhase::Armed {
                deadline: slot.deadline,
            }
        })
    }

    /// Earliest finite deadline across all tasks (for sleeping until then).
    pub fn next_deadline(&self) -> Option<Tick> {
        self.tasks
            .iter()
            .map(|t| t.deadline)
            .filter(|&d| d != TICK_INFINITY)
            .min()
    }

    /// Advance the clock to `now` and run every task that is due, one at a
    /// time, in deadline order.  Returns the number of tasks run.
    ///
    /// A task re-armed for a deadline that is still `<= now` runs again in
    /// the same pass; the clock never moves backwards.
    pub fn run_due(&mut self, now: Tick, runner: &mut impl TaskRunner) -> usize {
        self.now = self.now.max(now);
        let mut ran = 0;

        while let Some(task) = self.earliest_due() {
            let due = self.tasks[task.index()].deadline;
            self.tasks[task.index()].deadline = TICK_INFINITY;
            self.running = Some(Running { task, due });
            debug!(
                "Scheduler: running '{}' (due {} ms, now {} ms)",
                self.tasks[task.index()].label,
                due,
                self.now
            );
            runner.run(task, self);
            self.running = None;
            ran += 1;
        }

        ran
    }

    // ── Internal ──────────────────────────────────────────────

    fn set_deadline(&mut self, task: TaskId, deadline: Tick) -> Result<(), SchedulerError> {
        let slot = self
            .tasks
            .get_mut(task.index())
            .ok_or(SchedulerError::UnknownTask)?;
        slot.deadline = deadline;
        Ok(())
    }

    fn earliest_due(&self) -> Option<TaskId> {
        self.tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.deadline != TICK_INFINITY && t.deadline <= self.now)
            .min_by_key(|(i, t)| (t.deadline, *i))
            .map(|(i, _)| TaskId(i as u8))
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
