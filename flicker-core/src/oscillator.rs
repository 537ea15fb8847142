//! Non-blocking LED toggler.

use crate::mapper::HalfPeriod;
use crate::signal::Level;
use crate::time::Micros;

/// Tracks the LED level and when it last changed.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Oscillator {
    half_period: HalfPeriod,
    level: Level,
    last_toggle: Micros,
    toggles: u32,
}

impl Oscillator {
    /// Creates an oscillator holding `level` since `now`.
    #[must_use]
    pub const fn new(level: Level, now: Micros, half_period: HalfPeriod) -> Self {
        Self {
            half_period,
            level,
            last_toggle: now,
            toggles: 0,
        }
    }

    /// Flips the LED once more than `half_period` has passed since the last flip.
    ///
    /// Returns the new level when a toggle happened. Calling this again with
    /// the same `now` is a no-op, so it is safe to run on every loop
    /// iteration without any minimum interval.
    pub fn tick(&mut self, now: Micros, half_period: HalfPeriod) -> Option<Level> {
        self.half_period = half_period;
        if now.wrapping_since(self.last_toggle) > half_period.as_duration() {
            self.level = self.level.toggled();
            self.last_toggle = now;
            self.toggles = self.toggles.wrapping_add(1);
            Some(self.level)
        } else {
            None
        }
    }

    /// Current LED level.
    #[must_use]
    pub const fn level(&self) -> Level {
        self.level
    }

    /// Half-period applied on the most recent tick.
    #[must_use]
    pub const fn half_period(&self) -> HalfPeriod {
        self.half_period
    }

    /// Timestamp of the most recent toggle.
    #[must_use]
    pub const fn last_toggle(&self) -> Micros {
        self.last_toggle
    }

    /// Number of toggles performed, wrapping on overflow.
    #[must_use]
    pub const fn toggles(&self) -> u32 {
        self.toggles
    }
}

impl Default for Oscillator {
    fn default() -> Self {
        Self::new(Level::Low, Micros::ZERO, HalfPeriod::default())
    }
}

#[cfg(test)]
mod tests {
    use core::time::Duration;

    use super::*;
    use crate::mapper::MIN_HALF_PERIOD;

    fn at(micros: u32) -> Micros {
        Micros::new(micros)
    }

    #[test]
    fn toggles_only_after_half_period_strictly_elapses() {
        let mut osc = Oscillator::new(Level::Low, at(0), MIN_HALF_PERIOD);

        assert_eq!(osc.tick(at(5_000), MIN_HALF_PERIOD), None);
        assert_eq!(osc.tick(at(5_001), MIN_HALF_PERIOD), Some(Level::High));
        assert_eq!(osc.last_toggle(), at(5_001));
    }

    #[test]
    fn repeated_tick_at_same_instant_toggles_once() {
        let mut osc = Oscillator::new(Level::Low, at(0), MIN_HALF_PERIOD);

        assert!(osc.tick(at(6_000), MIN_HALF_PERIOD).is_some());
        for _ in 0..10 {
            assert_eq!(osc.tick(at(6_000), MIN_HALF_PERIOD), None);
        }
        assert_eq!(osc.toggles(), 1);
        assert_eq!(osc.level(), Level::High);
    }

    #[test]
    fn needs_a_full_half_period_between_toggles() {
        let mut osc = Oscillator::new(Level::Low, at(0), MIN_HALF_PERIOD);
        let step = MIN_HALF_PERIOD.as_duration() + Duration::from_micros(1);

        let first = at(0).wrapping_add(step);
        assert!(osc.tick(first, MIN_HALF_PERIOD).is_some());
        assert_eq!(osc.tick(first.wrapping_add(Duration::from_micros(4_999)), MIN_HALF_PERIOD), None);
        assert!(osc.tick(first.wrapping_add(step), MIN_HALF_PERIOD).is_some());
        assert_eq!(osc.toggles(), 2);
    }

    #[test]
    fn toggles_across_counter_rollover() {
        let start = at(u32::MAX - 1_000);
        let mut osc = Oscillator::new(Level::High, start, MIN_HALF_PERIOD);

        // 1_001 + 4_000 = 5_001us after the last toggle.
        assert_eq!(osc.tick(at(4_000), MIN_HALF_PERIOD), Some(Level::Low));
    }

    #[test]
    fn rollover_does_not_fake_a_long_interval() {
        let start = at(u32::MAX - 10);
        let mut osc = Oscillator::new(Level::Low, start, MIN_HALF_PERIOD);

        assert_eq!(osc.tick(at(10), MIN_HALF_PERIOD), None);
    }
}
