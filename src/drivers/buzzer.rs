//! Piezo buzzer driver (active buzzer, binary output).
//!
//! Generic over any `embedded-hal` [`OutputPin`].  Pin errors are logged
//! and the cached state is left unchanged, so a later `set(false)` still
//! retries the write.

use embedded_hal::digital::{OutputPin, PinState};
use log::warn;

pub struct Buzzer<P: OutputPin> {
    pin: P,
    on: bool,
    /// Off→on transitions since boot.
    activations: u32,
}

impl<P: OutputPin> Buzzer<P> {
    /// Take ownership of `pin` and make sure the buzzer is silent.
    pub fn new(mut pin: P) -> Self {
        if let Err(e) = pin.set_low() {
            warn!("buzzer: initial pin write failed: {:?}", e);
        }
        Self {
            pin,
            on: false,
            activations: 0,
        }
    }

    pub fn set(&mut self, on: bool) {
        match self.pin.set_state(PinState::from(on)) {
            Ok(()) => {
                if on && !self.on {
                    self.activations = self.activations.wrapping_add(1);
                }
                self.on = on;
            }
            Err(e) => warn!("buzzer: pin write failed: {:?}", e),
        }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn activations(&self) -> u32 {
        self.activations
    }
}
