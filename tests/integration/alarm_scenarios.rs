//! End-to-end alarm scenarios: platform events in, LED/buzzer/radio out.
//!
//! Time is driven explicitly through the scheduler so every beep edge can
//! be checked against its expected tick.

use crate::mock_hw::{HwCall, LogSink, MockHardware};

use co2monitor::alarm::{AlarmLevel, AlarmStateMachine};
use co2monitor::app::events::AppEvent;
use co2monitor::app::ports::LedMode;
use co2monitor::app::service::MonitorService;
use co2monitor::config::MonitorConfig;
use co2monitor::events::{BatteryEvent, Co2Event, Event};
use co2monitor::scheduler::{Scheduler, TaskPhase, Tick};

fn make_app() -> (MonitorService, Scheduler, MockHardware, LogSink) {
    let mut sched = Scheduler::new(0);
    let mut app = MonitorService::new(MonitorConfig::default(), "DEADBEEFCAFE", &mut sched)
        .expect("default config is valid");
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();
    app.start(&mut hw, &mut sink);
    hw.clear();
    (app, sched, hw, sink)
}

/// Advance to `now`, then deliver one CO2 reading.
fn reading_at(
    app: &mut MonitorService,
    sched: &mut Scheduler,
    hw: &mut MockHardware,
    sink: &mut LogSink,
    now: Tick,
    ppm: f32,
) -> Option<AlarmLevel> {
    app.run_due_tasks(now, sched, hw);
    hw.co2 = Ok(ppm);
    app.handle_event(Event::Co2(Co2Event::Update), sched, hw, sink);
    app.level()
}

/// Step the clock from `from` to `to` and collect `(tick, on)` for every
/// buzzer edge.
fn buzzer_edges(
    app: &mut MonitorService,
    sched: &mut Scheduler,
    hw: &mut MockHardware,
    from: Tick,
    to: Tick,
    step: Tick,
) -> Vec<(Tick, bool)> {
    let mut edges = Vec::new();
    let mut last = hw.buzzer_on();
    let mut t = from;
    while t <= to {
        app.run_due_tasks(t, sched, hw);
        let now = hw.buzzer_on();
        if now != last {
            edges.push((t, now));
            last = now;
        }
        t += step;
    }
    edges
}

// ── Normal → Ventilate → Dangerous → Normal ──────────────────

#[test]
fn levels_follow_readings() {
    let (mut app, mut sched, mut hw, mut sink) = make_app();

    let mut levels = Vec::new();
    levels.push(reading_at(&mut app, &mut sched, &mut hw, &mut sink, 0, 500.0));
    assert_eq!(hw.led(), Some(LedMode::Off));
    levels.push(reading_at(&mut app, &mut sched, &mut hw, &mut sink, 30_000, 900.0));
    assert_eq!(hw.led(), Some(LedMode::BlinkFast));
    assert_eq!(hw.beeps(), 0, "no beep before Dangerous");

    levels.push(reading_at(&mut app, &mut sched, &mut hw, &mut sink, 60_000, 1700.0));
    assert_eq!(hw.led(), Some(LedMode::On));
    assert!(hw.buzzer_on(), "buzzer forced on at the Dangerous reading");

    levels.push(reading_at(&mut app, &mut sched, &mut hw, &mut sink, 90_000, 500.0));
    assert!(!hw.buzzer_on(), "buzzer forced off at the Normal reading");
    assert_eq!(hw.led(), Some(LedMode::Off));
    assert_eq!(
        app.alarm().beep().next_beep_phase(&sched),
        Ok(TaskPhase::Parked)
    );

    assert_eq!(
        levels,
        vec![
            Some(AlarmLevel::Normal),
            Some(AlarmLevel::Ventilate),
            Some(AlarmLevel::Dangerous),
            Some(AlarmLevel::Normal),
        ]
    );
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::LevelChanged { .. })),
        4
    );
}

// ── Module hard errors cancel the cycle ──────────────────────

#[test]
fn sensor_error_cancels_running_cycle() {
    let (mut app, mut sched, mut hw, mut sink) = make_app();
    reading_at(&mut app, &mut sched, &mut hw, &mut sink, 0, 1700.0);
    assert!(app.dangerous_active());

    app.run_due_tasks(400, &mut sched, &mut hw);
    assert!(hw.buzzer_on(), "mid-beep");

    app.handle_event(Event::Co2(Co2Event::Error), &mut sched, &mut hw, &mut sink);
    assert!(!app.dangerous_active());
    assert!(!hw.buzzer_on());
    assert_eq!(hw.led(), Some(LedMode::BlinkSlow));
    assert_eq!(
        app.alarm().beep().next_beep_phase(&sched),
        Ok(TaskPhase::Parked)
    );
    assert!(sink.events.contains(&AppEvent::SensorFault { cancelled: true }));

    // Nothing beeps afterwards.
    let edges = buzzer_edges(&mut app, &mut sched, &mut hw, 400, 60_000, 100);
    assert!(edges.is_empty(), "unexpected edges {edges:?}");
}

#[test]
fn battery_error_cancels_running_cycle() {
    let (mut app, mut sched, mut hw, mut sink) = make_app();
    reading_at(&mut app, &mut sched, &mut hw, &mut sink, 0, 1700.0);
    app.run_due_tasks(400, &mut sched, &mut hw);
    assert!(hw.buzzer_on(), "mid-beep");

    app.handle_event(
        Event::Battery(BatteryEvent::Error),
        &mut sched,
        &mut hw,
        &mut sink,
    );
    assert!(!app.dangerous_active());
    assert!(!hw.buzzer_on());
    assert_eq!(hw.led(), Some(LedMode::BlinkSlow));
    assert_eq!(
        app.alarm().beep().next_beep_phase(&sched),
        Ok(TaskPhase::Parked)
    );
    assert!(sink.events.contains(&AppEvent::BatteryFault { cancelled: true }));

    let edges = buzzer_edges(&mut app, &mut sched, &mut hw, 400, 60_000, 100);
    assert!(edges.is_empty(), "unexpected edges {edges:?}");
}

#[test]
fn sensor_error_without_cycle_only_signals_fault() {
    let (mut app, mut sched, mut hw, mut sink) = make_app();
    reading_at(&mut app, &mut sched, &mut hw, &mut sink, 0, 900.0);
    app.handle_event(Event::Co2(Co2Event::Error), &mut sched, &mut hw, &mut sink);
    assert!(sink.events.contains(&AppEvent::SensorFault { cancelled: false }));
    assert_eq!(hw.led(), Some(LedMode::BlinkSlow));
    assert_eq!(hw.beeps(), 0);
}

// ── Periodicity ───────────────────────────────────────────────

#[test]
fn beep_cycle_is_periodic() {
    let (mut app, mut sched, mut hw, mut sink) = make_app();
    reading_at(&mut app, &mut sched, &mut hw, &mut sink, 0, 1800.0);

    let edges = buzzer_edges(&mut app, &mut sched, &mut hw, 0, 35_000, 250);
    assert_eq!(
        edges,
        vec![
            (1_000, false),
            (10_000, true),
            (11_000, false),
            (20_000, true),
            (21_000, false),
            (30_000, true),
            (31_000, false),
        ]
    );
}

#[test]
fn repeated_dangerous_does_not_restart_cycle() {
    let (mut app, mut sched, mut hw, mut sink) = make_app();
    reading_at(&mut app, &mut sched, &mut hw, &mut sink, 0, 1700.0);
    let beeps_after_start = hw.beeps();

    reading_at(&mut app, &mut sched, &mut hw, &mut sink, 4_000, 2400.0);
    reading_at(&mut app, &mut sched, &mut hw, &mut sink, 7_000, 1650.0);

    assert_eq!(hw.beeps(), beeps_after_start);
    assert_eq!(
        app.alarm().beep().next_beep_phase(&sched),
        Ok(TaskPhase::Armed { deadline: 10_000 })
    );
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::LevelChanged { .. })),
        1
    );
}

// ── Cancellation safety ───────────────────────────────────────

#[test]
fn cancellation_after_many_cycles() {
    let (mut app, mut sched, mut hw, mut sink) = make_app();
    reading_at(&mut app, &mut sched, &mut hw, &mut sink, 0, 1700.0);
    buzzer_edges(&mut app, &mut sched, &mut hw, 0, 40_500, 500);
    assert!(hw.buzzer_on(), "fifth beep in progress");
    assert_eq!(hw.beeps(), 5);

    reading_at(&mut app, &mut sched, &mut hw, &mut sink, 40_500, 1200.0);
    assert_eq!(app.level(), Some(AlarmLevel::Ventilate));
    assert!(!hw.buzzer_on());
    assert_eq!(
        app.alarm().beep().next_beep_phase(&sched),
        Ok(TaskPhase::Parked)
    );

    let edges = buzzer_edges(&mut app, &mut sched, &mut hw, 40_500, 120_000, 500);
    assert!(edges.is_empty());
    assert_eq!(sched.next_deadline(), None, "no orphaned timers");
}

#[test]
fn read_failure_keeps_cycle_running() {
    let (mut app, mut sched, mut hw, mut sink) = make_app();
    reading_at(&mut app, &mut sched, &mut hw, &mut sink, 0, 1700.0);

    app.run_due_tasks(5_000, &mut sched, &mut hw);
    let published_before = hw.published().len();
    hw.co2 = Err(co2monitor::error::SensorError::WarmingUp);
    app.handle_event(Event::Co2(Co2Event::Update), &mut sched, &mut hw, &mut sink);

    assert_eq!(hw.led(), Some(LedMode::BlinkSlow));
    assert!(app.dangerous_active());
    assert_eq!(app.level(), Some(AlarmLevel::Dangerous));
    assert_eq!(hw.published().len(), published_before, "nothing published");

    let edges = buzzer_edges(&mut app, &mut sched, &mut hw, 5_000, 11_000, 500);
    assert_eq!(edges, vec![(10_000, true), (11_000, false)]);
}

// ── Race safety ───────────────────────────────────────────────

#[test]
fn late_next_beep_after_cancel_is_inert() {
    let mut sched = Scheduler::new(0);
    let mut alarm = AlarmStateMachine::new(&MonitorConfig::default(), &mut sched)
        .expect("scheduler has room");
    let mut hw = MockHardware::new();

    alarm.on_reading(1700.0, &mut sched, &mut hw);
    alarm.on_reading(500.0, &mut sched, &mut hw);
    hw.clear();

    // Dispatch the already-cancelled task as if it had been selected
    // before the cancellation landed.
    let next_beep = alarm.beep().next_beep_task();
    assert!(alarm.run_task(next_beep, &mut sched, &mut hw));

    assert!(hw.calls.is_empty(), "side effects: {:?}", hw.calls);
    assert!(!hw.calls.contains(&HwCall::Buzzer(true)));
    assert_eq!(sched.phase(next_beep), Ok(TaskPhase::Parked));
}
