//! Sensor subsystem: the CO2 and battery measurement modules.
//!
//! Both modules are sampled together whenever the measurement timer
//! fires.  Each `measure()` caches its result and pushes the matching
//! platform event into the [`EventQueue`](crate::events::EventQueue);
//! the accessors then serve the cached values to the service through
//! the port traits.

pub mod battery;
pub mod co2;

use crate::events::EventQueue;
use battery::BatteryModule;
use co2::Co2Module;

/// Owns both measurement modules.
pub struct SensorHub {
    pub co2: Co2Module,
    pub battery: BatteryModule,
}

impl SensorHub {
    /// Construct a new hub.  Pass in pre-built modules (built in main
    /// where the ADC channels are known).
    pub fn new(co2: Co2Module, battery: BatteryModule) -> Self {
        Self { co2, battery }
    }

    /// Run one measurement round: CO2 first, then the battery.
    pub fn measure_all(&mut self, queue: &mut EventQueue) {
        self.co2.measure(queue);
        self.battery.measure(queue);
    }
}
