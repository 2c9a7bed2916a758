//! Output drivers, hardware initialisation, and peripheral helpers.

pub mod buzzer;
pub mod hw_init;
pub mod hw_timer;
pub mod led_patterns;
pub mod status_led;
pub mod watchdog;
