//! Measurement interval timer using ESP-IDF's esp_timer API.
//!
//! A single periodic timer raises the "measure due" flag every
//! `measurement_interval_ms`.  The main loop consumes the flag with
//! [`take_measure_due`] and samples both modules.  On simulation targets
//! the flag is raised by [`trigger_measure`] from the host loop or tests.
//!
//! Timer callbacks execute in the ESP timer task context (not ISR), so
//! the only shared state is one `AtomicBool`.

use core::sync::atomic::{AtomicBool, Ordering};

#[cfg(target_os = "espidf")]
use esp_idf_sys::*;

#[cfg(target_os = "espidf")]
use log::info;

/// Set by the timer callback, cleared by the main loop.
static MEASURE_DUE: AtomicBool = AtomicBool::new(false);

/// Raise the measure-due flag.
pub fn trigger_measure() {
    MEASURE_DUE.store(true, Ordering::Release);
}

/// Consume the measure-due flag.  Returns `true` at most once per trigger.
pub fn take_measure_due() -> bool {
    MEASURE_DUE.swap(false, Ordering::AcqRel)
}

#[cfg(target_os = "espidf")]
static mut MEASURE_TIMER: esp_timer_handle_t = core::ptr::null_mut();

/// SAFETY: MEASURE_TIMER is written once in `start_measurement_timer()`
/// before any timer callbacks fire.  Only called from the main task.
#[cfg(target_os = "espidf")]
unsafe fn measure_timer() -> esp_timer_handle_t {
    unsafe { MEASURE_TIMER }
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn measure_tick_cb(_arg: *mut core::ffi::c_void) {
    trigger_measure();
}

/// Start the periodic measurement timer.  The first measurement is
/// requested immediately so the device reports right after boot.
#[cfg(target_os = "espidf")]
pub fn start_measurement_timer(interval_ms: u64) {
    // SAFETY: MEASURE_TIMER is written here once at boot from the single
    // main-task context before the callback can fire.  The callback only
    // stores to an atomic.
    unsafe {
        let args = esp_timer_create_args_t {
            callback: Some(measure_tick_cb),
            arg: core::ptr::null_mut(),
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: b"measure\0".as_ptr() as *const _,
            skip_unhandled_events: true,
        };
        let ret = esp_timer_create(&args, &raw mut MEASURE_TIMER);
        if ret != ESP_OK {
            log::error!("hw_timer: measure timer create failed (rc={})", ret);
            return;
        }
        let ret = esp_timer_start_periodic(measure_timer(), interval_ms * 1_000);
        if ret != ESP_OK {
            log::error!("hw_timer: measure timer start failed (rc={})", ret);
            return;
        }
    }
    trigger_measure();
    info!("hw_timer: measurement every {} ms", interval_ms);
}

#[cfg(not(target_os = "espidf"))]
pub fn start_measurement_timer(interval_ms: u64) {
    trigger_measure();
    log::info!(
        "hw_timer(sim): periodic timer not started (interval {} ms driven by caller)",
        interval_ms
    );
}

/// Stop the measurement timer.
#[cfg(target_os = "espidf")]
pub fn stop_measurement_timer() {
    // SAFETY: measure_timer() contract: main task only; null-check
    // covers a failed start.
    unsafe {
        let t = measure_timer();
        if !t.is_null() {
            esp_timer_stop(t);
        }
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn stop_measurement_timer() {}
