//! GPIO / peripheral pin assignments for the CO2 monitor board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Sensors: analog (ADC1)
// ---------------------------------------------------------------------------

/// NDIR CO2 sensor analog output (0.4–2.0 V).
/// ADC1 channel 4 (GPIO 5 on ESP32-S3).
pub const CO2_ADC_GPIO: i32 = 5;

/// Battery pack through a 100k/82k divider.
/// ADC1 channel 5 (GPIO 6 on ESP32-S3).
pub const BATTERY_ADC_GPIO: i32 = 6;

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Indicator LED (active HIGH).
pub const LED_GPIO: i32 = 11;

/// Active piezo buzzer through an NPN low-side switch (active HIGH).
pub const BUZZER_GPIO: i32 = 12;

// ---------------------------------------------------------------------------
// UART debug
// ---------------------------------------------------------------------------

pub const UART_TX_GPIO: i32 = 17;
pub const UART_RX_GPIO: i32 = 18;
