//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the orchestration rules for the CO2 monitor:
//! routing platform events into the alarm state machine, dispatching
//! scheduler tasks to the beep cycle, and publishing telemetry.  All
//! interaction with hardware happens through **port traits** defined in
//! [`ports`], keeping this layer fully testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
