#![cfg_attr(not(target_os = "none"), allow(dead_code))]

//! Bridges embassy's 64-bit monotonic instant to the core's 32-bit counter.
//!
//! The core compares timestamps with wrapping arithmetic in `u32`, matching
//! the microsecond counter the meter was first built around. Truncating here
//! keeps the rollover behavior identical instead of hiding it behind a wider
//! type.

use embassy_time::Instant;
use flicker_core::time::Micros;

/// Keeps the low 32 bits of the instant's microsecond count.
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn micros_from_instant(instant: Instant) -> Micros {
    Micros::new(instant.as_micros() as u32)
}

/// Clock backed by the embassy time driver.
#[cfg(target_os = "none")]
#[derive(Copy, Clone, Debug, Default)]
pub struct EmbassyClock;

#[cfg(target_os = "none")]
impl flicker_core::time::Clock for EmbassyClock {
    fn now(&self) -> Micros {
        micros_from_instant(Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_wraps_like_hardware_counter() {
        let wrapped = Instant::from_micros(u64::from(u32::MAX) + 5);
        assert_eq!(micros_from_instant(wrapped), Micros::new(4));
    }

    #[test]
    fn small_instants_pass_through() {
        assert_eq!(micros_from_instant(Instant::from_micros(1_234)), Micros::new(1_234));
    }
}
