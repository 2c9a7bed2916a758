//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter      | Implements          | Connects to               |
//! |--------------|---------------------|---------------------------|
//! | `hardware`   | SensorPort          | ESP32 ADC (CO2, battery)  |
//! |              | BatteryPort         |                           |
//! |              | IndicatorPort       | LED GPIO                  |
//! |              | BuzzerPort          | Buzzer GPIO               |
//! |              | RadioPort           | via `radio`               |
//! | `radio`      | RadioPort           | ESP-NOW broadcast / sim   |
//! | `log_sink`   | EventSink           | Serial log output         |
//! | `device_id`  | n/a                 | eFuse factory MAC         |
//! | `time`       | n/a                 | ESP32 system timer        |

pub mod device_id;
pub mod hardware;
pub mod log_sink;
pub mod radio;
pub mod time;
