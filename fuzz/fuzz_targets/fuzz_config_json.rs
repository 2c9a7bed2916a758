//! Fuzz target: `MonitorConfig::from_json_slice`
//!
//! Any byte sequence either fails to parse or yields a config that
//! passes validation.
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use co2monitor::config::MonitorConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(config) = MonitorConfig::from_json_slice(data) {
        assert!(config.validate().is_ok());
        assert!(config.thresholds.ventilate_ppm < config.thresholds.dangerous_ppm);
    }
});
