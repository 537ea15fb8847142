//! Single-slot mailbox between the button interrupt and the polling loop.
//!
//! The pending flag and the latch timestamp share one 64-bit word, so the
//! consumer copies both out with a single atomic swap and can never observe a
//! flag without its payload. On cores without native 64-bit atomics,
//! `portable-atomic` falls back to a short critical section.

use portable_atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

use crate::signal::Level;
use crate::time::Micros;

const PENDING_BIT: u64 = 1 << 32;
const EMPTY: u64 = 0;

/// Confirmed button activation waiting to be reported.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LatchedAction {
    at: Micros,
}

impl LatchedAction {
    /// Creates an action latched at `at`.
    #[must_use]
    pub const fn new(at: Micros) -> Self {
        Self { at }
    }

    /// Timestamp of the accepted transition.
    #[must_use]
    pub const fn at(&self) -> Micros {
        self.at
    }

    const fn encode(self) -> u64 {
        PENDING_BIT | self.at.ticks() as u64
    }

    #[allow(clippy::cast_possible_truncation)]
    const fn decode(raw: u64) -> Option<Self> {
        if raw & PENDING_BIT == 0 {
            None
        } else {
            Some(Self::new(Micros::new(raw as u32)))
        }
    }
}

/// Result of posting into the mailbox.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PostOutcome {
    /// The slot was empty.
    Stored,
    /// An unconsumed action was replaced by the newer one.
    Coalesced,
}

/// Latch activity counters, for diagnostics only.
#[derive(Debug, Default)]
pub struct LatchStats {
    activations: AtomicU32,
    releases: AtomicU32,
    bounces: AtomicU32,
    coalesced: AtomicU32,
}

/// Plain copy of [`LatchStats`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct LatchStatsSnapshot {
    pub activations: u32,
    pub releases: u32,
    pub bounces: u32,
    pub coalesced: u32,
}

impl LatchStats {
    /// Creates zeroed counters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            activations: AtomicU32::new(0),
            releases: AtomicU32::new(0),
            bounces: AtomicU32::new(0),
            coalesced: AtomicU32::new(0),
        }
    }

    pub(crate) fn note_activation(&self) {
        self.activations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn note_release(&self) {
        self.releases.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn note_bounce(&self) {
        self.bounces.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn note_coalesced(&self) {
        self.coalesced.fetch_add(1, Ordering::Relaxed);
    }

    /// Copies the counters out. Individual fields may be from slightly
    /// different moments.
    #[must_use]
    pub fn snapshot(&self) -> LatchStatsSnapshot {
        LatchStatsSnapshot {
            activations: self.activations.load(Ordering::Relaxed),
            releases: self.releases.load(Ordering::Relaxed),
            bounces: self.bounces.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
        }
    }
}

/// Capacity-one mailbox shared by the interrupt producer and the loop consumer.
#[derive(Debug)]
pub struct ActionMailbox {
    slot: AtomicU64,
    level: AtomicBool,
    stats: LatchStats,
}

impl ActionMailbox {
    /// Creates an empty mailbox; usable in a `static`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slot: AtomicU64::new(EMPTY),
            level: AtomicBool::new(false),
            stats: LatchStats::new(),
        }
    }

    /// Stores `action`, replacing any unconsumed one.
    pub fn post(&self, action: LatchedAction) -> PostOutcome {
        let previous = self.slot.swap(action.encode(), Ordering::AcqRel);
        if LatchedAction::decode(previous).is_some() {
            PostOutcome::Coalesced
        } else {
            PostOutcome::Stored
        }
    }

    /// Removes and returns the pending action, clearing the flag.
    pub fn take(&self) -> Option<LatchedAction> {
        LatchedAction::decode(self.slot.swap(EMPTY, Ordering::AcqRel))
    }

    /// Returns `true` when an action is waiting, without consuming it.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        LatchedAction::decode(self.slot.load(Ordering::Acquire)).is_some()
    }

    /// Publishes the debounced level; later writes overwrite earlier ones.
    pub fn publish_level(&self, level: Level) {
        self.level.store(level.is_high(), Ordering::Release);
    }

    /// Last published debounced level.
    #[must_use]
    pub fn level(&self) -> Level {
        Level::from_high(self.level.load(Ordering::Acquire))
    }

    /// Latch activity counters.
    #[must_use]
    pub const fn stats(&self) -> &LatchStats {
        &self.stats
    }
}

impl Default for ActionMailbox {
    fn default() -> Self {
        Self::new()
    }
}
