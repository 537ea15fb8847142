//! Potentiometer sample to LED half-period mapping.

use core::fmt;
use core::time::Duration;

/// Largest value produced by the 10-bit ADC.
pub const ADC_MAX: u16 = 1023;

/// Shortest half-period, reached at the bottom of the potentiometer travel.
pub const MIN_HALF_PERIOD_MICROS: u32 = 5_000;
/// Longest half-period, reached at the top of the potentiometer travel.
pub const MAX_HALF_PERIOD_MICROS: u32 = 20_000;

/// Shortest half-period as a [`HalfPeriod`].
pub const MIN_HALF_PERIOD: HalfPeriod = HalfPeriod(MIN_HALF_PERIOD_MICROS);
/// Longest half-period as a [`HalfPeriod`].
pub const MAX_HALF_PERIOD: HalfPeriod = HalfPeriod(MAX_HALF_PERIOD_MICROS);

/// Numerator of `hertz = HALF_PERIOD_HZ_NUMERATOR / half_period_micros`.
///
/// One full blink spans two half-periods, so the frequency is
/// `1_000_000 / (2 * half_period_micros)`.
pub const HALF_PERIOD_HZ_NUMERATOR: f32 = 500_000.0;

/// Raw potentiometer reading in `[0, ADC_MAX]`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct AdcSample(u16);

impl AdcSample {
    /// Bottom of the potentiometer travel.
    pub const MIN: Self = Self(0);
    /// Top of the potentiometer travel.
    pub const MAX: Self = Self(ADC_MAX);

    /// Wraps a raw reading, clamping anything above [`ADC_MAX`].
    #[must_use]
    pub const fn new(raw: u16) -> Self {
        if raw > ADC_MAX {
            Self(ADC_MAX)
        } else {
            Self(raw)
        }
    }

    /// Returns the clamped reading.
    #[must_use]
    pub const fn value(self) -> u16 {
        self.0
    }
}

/// Time the LED spends in one level before toggling.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct HalfPeriod(u32);

impl HalfPeriod {
    /// Builds a half-period, clamping into `[MIN_HALF_PERIOD, MAX_HALF_PERIOD]`.
    #[must_use]
    pub const fn clamped(micros: u32) -> Self {
        if micros < MIN_HALF_PERIOD_MICROS {
            MIN_HALF_PERIOD
        } else if micros > MAX_HALF_PERIOD_MICROS {
            MAX_HALF_PERIOD
        } else {
            Self(micros)
        }
    }

    /// Half-period in microseconds.
    #[must_use]
    pub const fn as_micros(self) -> u32 {
        self.0
    }

    /// Half-period as a [`Duration`].
    #[must_use]
    pub const fn as_duration(self) -> Duration {
        Duration::from_micros(self.0 as u64)
    }

    /// Blink frequency in hertz.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hertz(self) -> f32 {
        HALF_PERIOD_HZ_NUMERATOR / self.0 as f32
    }

    /// Blink frequency in hundredths of a hertz, rounded to nearest.
    #[must_use]
    pub const fn centihertz(self) -> u32 {
        // 50_000_000 fits in u32 and the half-period is at least 5000, so the
        // rounding term never overflows.
        (50_000_000 + self.0 / 2) / self.0
    }
}

impl Default for HalfPeriod {
    fn default() -> Self {
        MAX_HALF_PERIOD
    }
}

impl fmt::Display for HalfPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}us", self.0)
    }
}

/// Maps a potentiometer sample linearly onto the half-period range.
///
/// Integer arithmetic truncates toward zero, so `0 -> 5000us` and
/// `1023 -> 20000us` exactly and the result never decreases as the sample
/// grows.
#[must_use]
pub const fn map_to_half_period(sample: AdcSample) -> HalfPeriod {
    let span = MAX_HALF_PERIOD_MICROS - MIN_HALF_PERIOD_MICROS;
    let scaled = sample.value() as u32 * span / ADC_MAX as u32;
    HalfPeriod::clamped(MIN_HALF_PERIOD_MICROS + scaled)
}
