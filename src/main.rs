//! CO2 Monitor Firmware: Main Entry Point
//!
//! Hexagonal architecture with a cooperative, single-task event loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter            LogEventSink     MonotonicClock    │
//! │  (Sensor+Battery+LED+       (EventSink)      (scheduler ticks) │
//! │   Buzzer+Radio)                                                │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              MonitorService (pure logic)               │    │
//! │  │  AlarmStateMachine · BeepCycle · MeasurementPublisher  │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Scheduler (deadline-ordered tasks) · EventQueue (FIFO)        │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::info;

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{AnyOutputPin, PinDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;

use co2monitor::adapters::device_id;
use co2monitor::adapters::hardware::HardwareAdapter;
use co2monitor::adapters::log_sink::LogEventSink;
use co2monitor::adapters::radio::{EspNowTransport, Radio};
use co2monitor::adapters::time::MonotonicClock;
use co2monitor::app::service::MonitorService;
use co2monitor::config::MonitorConfig;
use co2monitor::drivers::buzzer::Buzzer;
use co2monitor::drivers::hw_init::{self, ADC1_CH_BATTERY, ADC1_CH_CO2};
use co2monitor::drivers::hw_timer;
use co2monitor::drivers::status_led::StatusLed;
use co2monitor::drivers::watchdog::Watchdog;
use co2monitor::error::Error;
use co2monitor::events::EventQueue;
use co2monitor::pins;
use co2monitor::scheduler::Scheduler;
use co2monitor::sensors::SensorHub;
use co2monitor::sensors::battery::BatteryModule;
use co2monitor::sensors::co2::Co2Module;

/// Upper bound on one idle wait; keeps the fast blink smooth.
const LOOP_PERIOD_MS: u64 = 25;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  CO2 Monitor v{}                  ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = MonitorConfig::default();
    config.validate().map_err(Error::from)?;

    // ── 3. Peripherals ────────────────────────────────────────
    hw_init::init_peripherals()?;
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let mut watchdog = Watchdog::default();

    // SAFETY: each GPIO number is claimed exactly once, here.
    let led_pin = PinDriver::output(unsafe { AnyOutputPin::new(pins::LED_GPIO) })?;
    // SAFETY: as above.
    let buzzer_pin = PinDriver::output(unsafe { AnyOutputPin::new(pins::BUZZER_GPIO) })?;

    // ── 4. Device identity + radio ────────────────────────────
    let dev_id = device_id::to_hex(&device_id::read_device_id());
    info!("Device ID: {}", dev_id);

    let transport =
        EspNowTransport::new(peripherals.modem, sysloop, Some(nvs)).map_err(Error::from)?;
    let radio = Radio::new(transport, &dev_id);

    // ── 5. Construct adapters ─────────────────────────────────
    let sensors = SensorHub::new(
        Co2Module::new(ADC1_CH_CO2),
        BatteryModule::new(ADC1_CH_BATTERY, config.battery),
    );
    let mut hw = HardwareAdapter::new(
        sensors,
        StatusLed::new(led_pin),
        Buzzer::new(buzzer_pin),
        radio,
    );
    let mut log_sink = LogEventSink::new();
    let mut queue = EventQueue::new();

    // ── 6. Construct app service ──────────────────────────────
    let clock = MonotonicClock::new();
    let mut sched = Scheduler::new(clock.now_ms());
    let mut app = MonitorService::new(config.clone(), &dev_id, &mut sched)?;
    app.start(&mut hw, &mut log_sink);

    hw_timer::start_measurement_timer(config.measurement_interval_ms);
    info!("System ready. Entering event loop.");

    // ── 7. Event loop ─────────────────────────────────────────
    let mut last_ms = clock.now_ms();
    loop {
        // Due tasks first: this also brings the scheduler clock up to
        // date, so event handlers plan relative to the current tick.
        let now = clock.now_ms();
        app.run_due_tasks(now, &mut sched, &mut hw);

        if hw_timer::take_measure_due() {
            hw.measure(&mut queue);
        }

        while let Some(event) = queue.pop() {
            app.handle_event(event, &mut sched, &mut hw, &mut log_sink);
        }

        hw.tick_led(now.saturating_sub(last_ms) as u32);
        last_ms = now;

        watchdog.feed();

        // Sleep until the next task is due, but never longer than one
        // loop period so LED blinking and the measure flag stay responsive.
        let wait = sched
            .next_deadline()
            .map_or(LOOP_PERIOD_MS, |d| d.saturating_sub(clock.now_ms()))
            .clamp(1, LOOP_PERIOD_MS);
        FreeRtos::delay_ms(wait as u32);
    }
}
