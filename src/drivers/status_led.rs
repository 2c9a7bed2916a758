//! Single-colour indicator LED driver.
//!
//! Generic over any `embedded-hal` [`OutputPin`], so the same driver runs
//! on an `esp-idf-hal` `PinDriver` on the device and on a recording pin
//! in tests.  The blink waveform comes from [`LedPatternEngine`]; the pin
//! is only written when the level actually changes.
//!
//! Pin errors are logged and dropped: a stuck LED must not stop the alarm.

use embedded_hal::digital::{OutputPin, PinState};
use log::warn;

use crate::app::ports::LedMode;
use crate::drivers::led_patterns::LedPatternEngine;

pub struct StatusLed<P: OutputPin> {
    pin: P,
    engine: LedPatternEngine,
    lit: bool,
}

impl<P: OutputPin> StatusLed<P> {
    /// Take ownership of `pin` and drive it low.
    pub fn new(pin: P) -> Self {
        let mut led = Self {
            pin,
            engine: LedPatternEngine::new(),
            lit: true,
        };
        led.write(false);
        led
    }

    /// Select the indication.  The pin follows on the next `tick()`.
    pub fn set_mode(&mut self, mode: LedMode) {
        self.engine.set_mode(mode);
    }

    pub fn mode(&self) -> LedMode {
        self.engine.mode()
    }

    /// Advance the waveform and update the pin.
    pub fn tick(&mut self, delta_ms: u32) {
        let level = self.engine.tick(delta_ms);
        self.write(level);
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    fn write(&mut self, level: bool) {
        if level == self.lit {
            return;
        }
        match self.pin.set_state(PinState::from(level)) {
            Ok(()) => self.lit = level,
            Err(e) => warn!("status_led: pin write failed: {:?}", e),
        }
    }
}
