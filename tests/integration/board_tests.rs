//! Whole-board tests: simulated ADC samples in, decoded radio frames out.
//!
//! Uses the real sensor modules, LED/buzzer drivers and radio framing;
//! only the GPIO pins and the radio medium are stand-ins.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};

use crate::mock_hw::LogSink;

use co2monitor::adapters::hardware::HardwareAdapter;
use co2monitor::adapters::radio::{Payload, Radio, SimTransport, TOPIC_PAIRING};
use co2monitor::alarm::AlarmLevel;
use co2monitor::app::events::AppEvent;
use co2monitor::app::ports::LedMode;
use co2monitor::app::service::MonitorService;
use co2monitor::config::MonitorConfig;
use co2monitor::drivers::buzzer::Buzzer;
use co2monitor::drivers::hw_init::{ADC1_CH_BATTERY, ADC1_CH_CO2};
use co2monitor::drivers::status_led::StatusLed;
use co2monitor::events::EventQueue;
use co2monitor::publisher::{TOPIC_CHARGE, TOPIC_CO2, TOPIC_DEVICE_ID, TOPIC_VOLTAGE};
use co2monitor::scheduler::{Scheduler, Tick};
use co2monitor::sensors::SensorHub;
use co2monitor::sensors::battery::BatteryModule;
use co2monitor::sensors::co2::Co2Module;

const DEVICE: &str = "DEADBEEFCAFE";

// Raw 12-bit samples for the default calibration and divider.
const RAW_CO2_NORMAL: u16 = 600; // ~169 ppm
const RAW_CO2_DANGEROUS: u16 = 1247; // 1700 ppm
const RAW_CO2_WARMING: u16 = 100; // below the zero point
const RAW_BATT_FULLISH: u16 = 3452; // ~5.80 V
const RAW_BATT_LOW: u16 = 2856; // ~4.80 V
const RAW_BATT_CRITICAL: u16 = 2618; // ~4.40 V

struct Pin;

impl ErrorType for Pin {
    type Error = Infallible;
}

impl OutputPin for Pin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

type Board = HardwareAdapter<Pin, Pin, SimTransport>;

struct Rig {
    hw: Board,
    app: MonitorService,
    sched: Scheduler,
    queue: EventQueue,
    sink: LogSink,
}

impl Rig {
    fn new() -> Self {
        let config = MonitorConfig::default();
        let sensors = SensorHub::new(
            Co2Module::new(ADC1_CH_CO2),
            BatteryModule::new(ADC1_CH_BATTERY, config.battery),
        );
        let mut hw = HardwareAdapter::new(
            sensors,
            StatusLed::new(Pin),
            Buzzer::new(Pin),
            Radio::new(SimTransport::new(), DEVICE),
        );
        let mut sched = Scheduler::new(0);
        let mut app = MonitorService::new(config, DEVICE, &mut sched).expect("valid config");
        let mut sink = LogSink::new();
        app.start(&mut hw, &mut sink);
        Self {
            hw,
            app,
            sched,
            queue: EventQueue::new(),
            sink,
        }
    }

    /// One pass of the firmware loop with a measurement at `now`.
    fn measure_at(&mut self, now: Tick, co2_raw: Option<u16>, batt_raw: Option<u16>) {
        self.app.run_due_tasks(now, &mut self.sched, &mut self.hw);
        let sensors = self.hw.sensors_mut();
        sensors.co2.sim_set_adc(co2_raw);
        sensors.battery.sim_set_adc(batt_raw);
        self.hw.measure(&mut self.queue);
        while let Some(event) = self.queue.pop() {
            self.app
                .handle_event(event, &mut self.sched, &mut self.hw, &mut self.sink);
        }
    }

    fn topics(&self) -> Vec<String> {
        self.hw
            .radio()
            .transport()
            .decoded()
            .iter()
            .map(|f| f.topic.to_string())
            .collect()
    }
}

#[test]
fn boot_announces_device() {
    let rig = Rig::new();
    let frames = rig.hw.radio().transport().decoded();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].topic, TOPIC_PAIRING);
    assert_eq!(frames[0].device, DEVICE);
    assert!(matches!(
        frames[0].payload,
        Payload::Pairing { name: "co2-monitor", .. }
    ));
}

#[test]
fn measurement_reaches_the_radio() {
    let mut rig = Rig::new();
    rig.measure_at(0, Some(RAW_CO2_NORMAL), Some(RAW_BATT_FULLISH));

    assert_eq!(rig.app.level(), Some(AlarmLevel::Normal));
    assert_eq!(rig.hw.led().mode(), LedMode::Off);
    assert_eq!(
        rig.topics(),
        vec![TOPIC_PAIRING, TOPIC_CO2, TOPIC_VOLTAGE, TOPIC_CHARGE, TOPIC_DEVICE_ID]
    );

    let frames = rig.hw.radio().transport().decoded();
    assert_eq!(frames[3].payload, Payload::Int(88));
    assert_eq!(frames[4].payload, Payload::Str(DEVICE));
    match frames[2].payload {
        Payload::Float(v) => assert!((v - 5.8).abs() < 0.01, "voltage {v}"),
        other => panic!("unexpected voltage payload {other:?}"),
    }
}

#[test]
fn dangerous_reading_drives_led_and_buzzer() {
    let mut rig = Rig::new();
    rig.measure_at(0, Some(RAW_CO2_DANGEROUS), Some(RAW_BATT_FULLISH));

    assert_eq!(rig.app.level(), Some(AlarmLevel::Dangerous));
    assert!(rig.hw.led().is_lit());
    assert!(rig.hw.buzzer().is_on());

    rig.app.run_due_tasks(1_000, &mut rig.sched, &mut rig.hw);
    assert!(!rig.hw.buzzer().is_on());
    rig.app.run_due_tasks(10_000, &mut rig.sched, &mut rig.hw);
    assert!(rig.hw.buzzer().is_on());
    assert_eq!(rig.hw.buzzer().activations(), 2);

    rig.measure_at(10_500, Some(RAW_CO2_NORMAL), Some(RAW_BATT_FULLISH));
    assert!(!rig.hw.buzzer().is_on());
    assert!(!rig.hw.led().is_lit());
    assert!(!rig.app.dangerous_active());
}

#[test]
fn adc_failure_is_a_sensor_fault() {
    let mut rig = Rig::new();
    rig.measure_at(0, Some(RAW_CO2_DANGEROUS), Some(RAW_BATT_FULLISH));
    assert!(rig.app.dangerous_active());

    rig.measure_at(400, None, Some(RAW_BATT_FULLISH));
    assert!(!rig.app.dangerous_active());
    assert!(!rig.hw.buzzer().is_on());
    assert_eq!(rig.hw.led().mode(), LedMode::BlinkSlow);
    assert!(
        rig.sink
            .events
            .contains(&AppEvent::SensorFault { cancelled: true })
    );
}

#[test]
fn warming_sensor_is_a_read_failure() {
    let mut rig = Rig::new();
    rig.measure_at(0, Some(RAW_CO2_WARMING), Some(RAW_BATT_FULLISH));

    assert_eq!(rig.app.level(), None);
    assert_eq!(rig.hw.led().mode(), LedMode::BlinkSlow);
    assert_eq!(rig.topics(), vec![TOPIC_PAIRING]);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::ReadFailed(_))), 1);
}

#[test]
fn battery_thresholds_fire_once_each() {
    let mut rig = Rig::new();
    rig.measure_at(0, Some(RAW_CO2_NORMAL), Some(RAW_BATT_LOW));
    rig.measure_at(30_000, Some(RAW_CO2_NORMAL), Some(RAW_BATT_LOW));
    rig.measure_at(60_000, Some(RAW_CO2_NORMAL), Some(RAW_BATT_CRITICAL));
    rig.measure_at(90_000, Some(RAW_CO2_NORMAL), Some(RAW_BATT_CRITICAL));

    assert_eq!(rig.sink.count(|e| *e == AppEvent::BatteryLow), 1);
    assert_eq!(rig.sink.count(|e| *e == AppEvent::BatteryCritical), 1);
    // Low and critical levels never touch the alarm outputs.
    assert_eq!(rig.app.level(), Some(AlarmLevel::Normal));
    assert_eq!(rig.hw.led().mode(), LedMode::Off);
}

#[test]
fn battery_adc_failure_forces_safe_state() {
    let mut rig = Rig::new();
    rig.measure_at(0, Some(RAW_CO2_DANGEROUS), None);

    // The CO2 update is handled first and still publishes what it has.
    assert_eq!(
        rig.topics(),
        vec![TOPIC_PAIRING, TOPIC_CO2, TOPIC_DEVICE_ID]
    );
    assert_eq!(
        rig.sink
            .count(|e| *e == AppEvent::BatteryFault { cancelled: true }),
        1
    );
    assert!(!rig.app.dangerous_active());
    assert!(!rig.hw.buzzer().is_on());
    assert_eq!(rig.hw.led().mode(), LedMode::BlinkSlow);

    rig.app.run_due_tasks(30_000, &mut rig.sched, &mut rig.hw);
    assert_eq!(rig.hw.buzzer().activations(), 1);
}

#[test]
fn offline_radio_keeps_the_alarm_working() {
    let mut rig = Rig::new();
    rig.hw.radio_mut().transport_mut().set_offline(true);
    rig.measure_at(0, Some(RAW_CO2_DANGEROUS), Some(RAW_BATT_FULLISH));

    assert!(rig.hw.buzzer().is_on());
    assert_eq!(rig.app.publisher().frames_failed(), 4);
    assert_eq!(rig.topics(), vec![TOPIC_PAIRING]);
}
