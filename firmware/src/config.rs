#![cfg_attr(not(target_os = "none"), allow(dead_code))]

//! Board wiring and compile-time settings.

use flicker_core::debounce::DebounceConfig;

/// Baud rate of the report console on USART2.
pub const SERIAL_BAUD: u32 = 115_200;

/// Button debouncing: active-high with pull-down, rising-edge EXTI, 40 ms lockout.
pub const BUTTON_LATCH: DebounceConfig = DebounceConfig::DEFAULT;

/// Pin assignment, reported once at startup.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct BoardPins {
    pub led: &'static str,
    pub button: &'static str,
    pub potentiometer: &'static str,
    pub serial_tx: &'static str,
}

/// Wiring on the controller board.
pub const PINS: BoardPins = BoardPins {
    led: "PA5",
    button: "PC13",
    potentiometer: "PA0/ADC1_IN0",
    serial_tx: "PA2/USART2_TX",
};
