#![no_std]

// Shared logic for the flicker fusion meter.
//
// Everything here is hardware independent so the same state machines run in
// the STM32 firmware, the host emulator, and plain `cargo test`.

pub mod controller;
pub mod debounce;
pub mod mailbox;
pub mod mapper;
pub mod oscillator;
pub mod report;
pub mod segments;
pub mod signal;
pub mod telemetry;
pub mod time;
