//! Platform event queue.
//!
//! Events are produced by the sensor and battery modules when a
//! measurement completes (or fails) and are consumed by the main loop,
//! which processes them one at a time in FIFO order.
//!
//! ```text
//! ┌───────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Co2Module     │────▶│              │     │              │
//! │ BatteryModule │────▶│  EventQueue  │────▶│  Main Loop   │
//! │               │     │  (bounded)   │     │  (consumer)  │
//! └───────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! Everything runs on the main task, so the queue is a plain owned
//! `heapless::Deque`; the only cross-context signal is the measurement
//! timer flag in [`drivers::hw_timer`](crate::drivers::hw_timer).

use log::warn;

/// Maximum number of pending events.
const EVENT_QUEUE_CAP: usize = 16;

/// CO2 sensor module events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Co2Event {
    /// A measurement finished; the concentration accessor may still fail.
    Update,
    /// The module itself failed and can no longer be trusted.
    Error,
}

/// Battery module events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryEvent {
    Update,
    Error,
    /// Voltage dropped below the low threshold.
    LevelLow,
    /// Voltage dropped below the critical threshold.
    LevelCritical,
}

/// Every event the main loop can receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Co2(Co2Event),
    Battery(BatteryEvent),
}

impl From<Co2Event> for Event {
    fn from(e: Co2Event) -> Self {
        Self::Co2(e)
    }
}

impl From<BatteryEvent> for Event {
    fn from(e: BatteryEvent) -> Self {
        Self::Battery(e)
    }
}

/// Bounded FIFO of pending platform events.
pub struct EventQueue {
    pending: heapless::Deque<Event, EVENT_QUEUE_CAP>,
    dropped: u32,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            pending: heapless::Deque::new(),
            dropped: 0,
        }
    }

    /// Push an event.  Returns `false` if the queue is full (event dropped).
    pub fn push(&mut self, event: impl Into<Event>) -> bool {
        let event = event.into();
        if self.pending.push_back(event).is_err() {
            self.dropped = self.dropped.saturating_add(1);
            warn!("Event queue full, dropped {:?}", event);
            return false;
        }
        true
    }

    /// Pop the oldest event, if any.
    pub fn pop(&mut self) -> Option<Event> {
        self.pending.pop_front()
    }

    /// Drain all pending events into a callback, in FIFO order.
    pub fn drain(&mut self, mut handler: impl FnMut(Event)) {
        while let Some(event) = self.pop() {
            handler(event);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Events dropped on overflow since boot.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}
