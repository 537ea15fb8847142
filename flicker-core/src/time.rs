//! Wrapping microsecond timestamps and the clock abstraction.
//!
//! The target exposes a free-running 32-bit microsecond counter that rolls
//! over roughly every 71.6 minutes. Timestamps are therefore compared only by
//! `wrapping_sub` in the counter's native width: a delta computed across a
//! rollover is still the small positive value the caller expects, as long as
//! the true interval is shorter than one full counter period.

use core::cell::Cell;
use core::fmt;
use core::time::Duration;

/// Raw value of the free-running microsecond counter.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Micros(u32);

impl Micros {
    /// Counter value at reset.
    pub const ZERO: Self = Self(0);

    /// Wraps a raw counter value.
    #[must_use]
    pub const fn new(ticks: u32) -> Self {
        Self(ticks)
    }

    /// Returns the raw counter value.
    #[must_use]
    pub const fn ticks(self) -> u32 {
        self.0
    }

    /// Elapsed time from `earlier` to `self`, modulo the counter period.
    #[must_use]
    pub const fn wrapping_since(self, earlier: Micros) -> Duration {
        Duration::from_micros(self.0.wrapping_sub(earlier.0) as u64)
    }

    /// Advances the timestamp by `delta`, wrapping at the counter width.
    #[must_use]
    pub fn wrapping_add(self, delta: Duration) -> Self {
        Self(self.0.wrapping_add(truncate_micros(delta)))
    }
}

impl fmt::Display for Micros {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}us", self.0)
    }
}

/// Lower 32 bits of a duration's microsecond count, matching the counter width.
#[allow(clippy::cast_possible_truncation)]
fn truncate_micros(delta: Duration) -> u32 {
    delta.as_micros() as u32
}

/// Source of the current counter value.
pub trait Clock {
    /// Samples the counter.
    fn now(&self) -> Micros;
}

/// Clock advanced explicitly by its owner; used by host tests and the emulator.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u32>,
}

impl ManualClock {
    /// Creates a clock reading `start`.
    #[must_use]
    pub const fn starting_at(start: Micros) -> Self {
        Self {
            now: Cell::new(start.ticks()),
        }
    }

    /// Moves the clock forward by `delta`, wrapping like the hardware counter.
    pub fn advance(&self, delta: Duration) -> Micros {
        let next = Micros::new(self.now.get()).wrapping_add(delta);
        self.now.set(next.ticks());
        next
    }

    /// Jumps the clock to an absolute counter value.
    pub fn set(&self, now: Micros) {
        self.now.set(now.ticks());
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Micros {
        Micros::new(self.now.get())
    }
}
