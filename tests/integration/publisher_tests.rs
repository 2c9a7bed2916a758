//! Publication behaviour seen from the radio side.

use crate::mock_hw::{HwCall, LogSink, MockHardware, Value};

use co2monitor::app::events::AppEvent;
use co2monitor::app::service::{FW_VERSION, MonitorService};
use co2monitor::config::MonitorConfig;
use co2monitor::error::{BatteryError, RadioError};
use co2monitor::events::{Co2Event, Event};
use co2monitor::publisher::{TOPIC_CHARGE, TOPIC_CO2, TOPIC_DEVICE_ID, TOPIC_VOLTAGE};
use co2monitor::scheduler::Scheduler;

const DEVICE: &str = "DEADBEEFCAFE";

fn service(sched: &mut Scheduler) -> MonitorService {
    MonitorService::new(MonitorConfig::default(), DEVICE, sched).expect("default config is valid")
}

fn deliver(app: &mut MonitorService, sched: &mut Scheduler, hw: &mut MockHardware, sink: &mut LogSink) {
    app.handle_event(Event::Co2(Co2Event::Update), sched, hw, sink);
}

#[test]
fn start_sends_pairing_request() {
    let mut sched = Scheduler::new(0);
    let mut app = service(&mut sched);
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();

    app.start(&mut hw, &mut sink);

    assert_eq!(
        hw.calls,
        vec![HwCall::Pairing {
            name: "co2-monitor".into(),
            version: FW_VERSION.into(),
        }]
    );
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Started { .. })), 1);
}

#[test]
fn full_reading_publishes_four_topics_in_order() {
    let mut sched = Scheduler::new(0);
    let mut app = service(&mut sched);
    let mut hw = MockHardware::with_co2(650.0);
    let mut sink = LogSink::new();

    deliver(&mut app, &mut sched, &mut hw, &mut sink);

    assert_eq!(
        hw.published(),
        vec![
            (TOPIC_CO2.to_string(), Value::Float(650.0)),
            (TOPIC_VOLTAGE.to_string(), Value::Float(5.8)),
            (TOPIC_CHARGE.to_string(), Value::Int(88)),
            (TOPIC_DEVICE_ID.to_string(), Value::Str(DEVICE.into())),
        ]
    );
    assert_eq!(app.publisher().frames_sent(), 4);
    let telemetry = app.last_telemetry().expect("telemetry recorded");
    assert_eq!(telemetry.report.frames_sent(), 4);
    assert_eq!(telemetry.voltage, Some(5.8));
    assert_eq!(telemetry.charge_percent, Some(88));
}

// Voltage unavailable, charge still known.
#[test]
fn missing_voltage_is_omitted() {
    let mut sched = Scheduler::new(0);
    let mut app = service(&mut sched);
    let mut hw = MockHardware::with_co2(1000.0);
    hw.voltage = Err(BatteryError::OutOfRange);
    hw.charge = Ok(50);
    let mut sink = LogSink::new();

    deliver(&mut app, &mut sched, &mut hw, &mut sink);

    assert_eq!(
        hw.published_topics(),
        vec![TOPIC_CO2, TOPIC_CHARGE, TOPIC_DEVICE_ID]
    );
    let telemetry = app.last_telemetry().expect("telemetry recorded");
    assert!(!telemetry.report.voltage);
    assert!(telemetry.report.charge);
}

#[test]
fn missing_battery_still_publishes_co2_and_identity() {
    let mut sched = Scheduler::new(0);
    let mut app = service(&mut sched);
    let mut hw = MockHardware::with_co2(420.0);
    hw.voltage = Err(BatteryError::NoMeasurement);
    hw.charge = Err(BatteryError::NoMeasurement);
    let mut sink = LogSink::new();

    deliver(&mut app, &mut sched, &mut hw, &mut sink);

    assert_eq!(hw.published_topics(), vec![TOPIC_CO2, TOPIC_DEVICE_ID]);
}

#[test]
fn radio_failure_is_swallowed() {
    let mut sched = Scheduler::new(0);
    let mut app = service(&mut sched);
    let mut hw = MockHardware::with_co2(1700.0);
    hw.radio_error = Some(RadioError::NotReady);
    let mut sink = LogSink::new();

    deliver(&mut app, &mut sched, &mut hw, &mut sink);

    assert!(hw.published().is_empty());
    assert_eq!(app.publisher().frames_failed(), 4);
    let telemetry = app.last_telemetry().expect("telemetry recorded");
    assert_eq!(telemetry.report.frames_sent(), 0);

    // The alarm still reacted.
    assert!(hw.buzzer_on());
    assert!(app.dangerous_active());
}

#[test]
fn failed_reading_publishes_nothing() {
    let mut sched = Scheduler::new(0);
    let mut app = service(&mut sched);
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();

    deliver(&mut app, &mut sched, &mut hw, &mut sink);

    assert!(hw.published().is_empty());
    assert!(app.last_telemetry().is_none());
    assert_eq!(sink.count(|e| matches!(e, AppEvent::ReadFailed(_))), 1);
}

#[test]
fn every_reading_is_published() {
    let mut sched = Scheduler::new(0);
    let mut app = service(&mut sched);
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();

    for (i, ppm) in [500.0, 500.0, 900.0, 900.0].into_iter().enumerate() {
        let now = i as u64 * 30_000;
        app.run_due_tasks(now, &mut sched, &mut hw);
        hw.co2 = Ok(ppm);
        deliver(&mut app, &mut sched, &mut hw, &mut sink);
    }

    let co2_frames = hw
        .published_topics()
        .iter()
        .filter(|t| t.as_str() == TOPIC_CO2)
        .count();
    assert_eq!(co2_frames, 4, "unchanged levels are still published");
    assert_eq!(app.readings(), 4);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Telemetry(_))), 4);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::LevelChanged { .. })), 2);
}
