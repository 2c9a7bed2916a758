//! Indicator LED waveform generator.
//!
//! Turns the current [`LedMode`] into an on/off level as time passes.
//! The main loop calls `tick()` every iteration and writes the result to
//! the LED pin.
//!
//! | Mode       | Waveform                    | Rate |
//! |------------|-----------------------------|------|
//! | Off        | always off                  | n/a  |
//! | On         | always on                   | n/a  |
//! | BlinkSlow  | 50 % square wave            | 1 Hz |
//! | BlinkFast  | 50 % square wave            | 4 Hz |
//!
//! Changing the mode restarts the waveform at its "on" half, so a new
//! indication is visible immediately.

use crate::app::ports::LedMode;

const SLOW_PERIOD_MS: u32 = 1000;
const FAST_PERIOD_MS: u32 = 250;

/// LED pattern engine. Stack-allocated, no heap.
#[derive(Debug)]
pub struct LedPatternEngine {
    mode: LedMode,
    phase_ms: u32,
}

impl Default for LedPatternEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LedPatternEngine {
    pub fn new() -> Self {
        Self {
            mode: LedMode::Off,
            phase_ms: 0,
        }
    }

    /// Select a new mode.  Re-selecting the current mode keeps the phase.
    pub fn set_mode(&mut self, mode: LedMode) {
        if mode != self.mode {
            self.mode = mode;
            self.phase_ms = 0;
        }
    }

    pub fn mode(&self) -> LedMode {
        self.mode
    }

    /// Advance by `delta_ms` and return whether the LED should be lit.
    pub fn tick(&mut self, delta_ms: u32) -> bool {
        self.phase_ms = self.phase_ms.wrapping_add(delta_ms);
        self.level()
    }

    /// Current output without advancing time.
    pub fn level(&self) -> bool {
        match self.mode {
            LedMode::Off => false,
            LedMode::On => true,
            LedMode::BlinkSlow => Self::square(self.phase_ms, SLOW_PERIOD_MS),
            LedMode::BlinkFast => Self::square(self.phase_ms, FAST_PERIOD_MS),
        }
    }

    fn square(phase_ms: u32, period_ms: u32) -> bool {
        (phase_ms % period_ms) < period_ms / 2
    }
}
