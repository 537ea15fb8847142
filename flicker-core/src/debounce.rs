//! Lockout-window debouncer and the interrupt-side button latch.
//!
//! The button line raises an interrupt on edges, not on a fixed tick, so the
//! debouncer does not count consecutive stable samples. Instead every accepted
//! transition opens a lockout window; samples arriving inside it are treated
//! as contact bounce and discarded. A genuine double transition faster than
//! the lockout is lost, which is acceptable for a human-operated button.
//!
//! [`Debouncer`] is plain data driven by `(level, timestamp)` samples so it
//! can be exercised without hardware. [`ButtonLatch`] is the producer half of
//! the cross-context contract: it owns the debouncer inside the interrupt
//! context and publishes activations into an [`ActionMailbox`].

use core::time::Duration;

use crate::mailbox::{ActionMailbox, LatchedAction, PostOutcome};
use crate::signal::Level;
use crate::time::Micros;

/// Default lockout window after an accepted transition.
pub const DEFAULT_LOCKOUT: Duration = Duration::from_millis(40);

/// Which edges the input peripheral delivers to the latch.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum TriggerMode {
    /// Only edges toward the active level; releases are never observed.
    #[default]
    Rising,
    /// Every edge, carrying the level sampled after it.
    AnyChange,
}

impl TriggerMode {
    /// Returns `true` when the peripheral would raise an interrupt for the raw
    /// transition `previous -> next`.
    #[must_use]
    pub fn fires(self, previous: Level, next: Level, active: Level) -> bool {
        if previous == next {
            return false;
        }
        match self {
            TriggerMode::Rising => next == active,
            TriggerMode::AnyChange => true,
        }
    }
}

/// Compile-time debouncer configuration.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DebounceConfig {
    lockout: Duration,
    active: Level,
    trigger: TriggerMode,
}

impl DebounceConfig {
    /// Active-high button with a pull-down, rising-edge interrupt, 40 ms lockout.
    pub const DEFAULT: Self = Self::new(DEFAULT_LOCKOUT, Level::High, TriggerMode::Rising);

    /// Creates a configuration.
    #[must_use]
    pub const fn new(lockout: Duration, active: Level, trigger: TriggerMode) -> Self {
        Self {
            lockout,
            active,
            trigger,
        }
    }

    /// Returns a copy with a different lockout window.
    #[must_use]
    pub const fn with_lockout(mut self, lockout: Duration) -> Self {
        self.lockout = lockout;
        self
    }

    /// Returns a copy with a different trigger mode.
    #[must_use]
    pub const fn with_trigger(mut self, trigger: TriggerMode) -> Self {
        self.trigger = trigger;
        self
    }

    /// Lockout window.
    #[must_use]
    pub const fn lockout(&self) -> Duration {
        self.lockout
    }

    /// Level that counts as "pressed".
    #[must_use]
    pub const fn active(&self) -> Level {
        self.active
    }

    /// Level the button rests at.
    #[must_use]
    pub const fn inactive(&self) -> Level {
        self.active.toggled()
    }

    /// Edge delivery mode.
    #[must_use]
    pub const fn trigger(&self) -> TriggerMode {
        self.trigger
    }
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Whether the debouncer is currently ignoring samples.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DebouncePhase {
    /// No lockout in effect; the next differing sample is accepted.
    Idle,
    /// Inside the lockout window of the last accepted transition.
    Locked,
}

/// Result of feeding one sample to the debouncer.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SampleOutcome {
    /// Arrived inside the lockout window and was discarded.
    Bounced,
    /// Matched the stable level; nothing changed.
    Unchanged,
    /// Accepted transition to the inactive level.
    Released,
    /// Accepted transition to the active level; an action is raised.
    Activated,
}

impl SampleOutcome {
    /// Returns `true` when the sample changed the stable level.
    #[must_use]
    pub const fn is_transition(self) -> bool {
        matches!(self, SampleOutcome::Released | SampleOutcome::Activated)
    }
}

/// Lockout-window debouncer state.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Debouncer {
    config: DebounceConfig,
    raw: Level,
    stable: Level,
    last_transition: Option<Micros>,
}

impl Debouncer {
    /// Creates a debouncer resting at the inactive level with no lockout pending.
    #[must_use]
    pub const fn new(config: DebounceConfig) -> Self {
        Self {
            config,
            raw: config.inactive(),
            stable: config.inactive(),
            last_transition: None,
        }
    }

    /// Applies one raw sample taken at `now`.
    pub fn sample(&mut self, level: Level, now: Micros) -> SampleOutcome {
        self.raw = level;

        if self.phase(now) == DebouncePhase::Locked {
            return SampleOutcome::Bounced;
        }

        if level == self.stable {
            return SampleOutcome::Unchanged;
        }

        self.stable = level;
        self.last_transition = Some(now);
        if level == self.config.active() {
            SampleOutcome::Activated
        } else {
            SampleOutcome::Released
        }
    }

    /// Treats the line as released if the lockout has expired.
    ///
    /// Used when the peripheral only reports rising edges: a new rising edge
    /// proves the button went inactive in between, even though that edge
    /// was never delivered. The lockout timestamp is left untouched.
    pub fn rearm(&mut self, now: Micros) -> bool {
        if self.phase(now) == DebouncePhase::Idle && self.stable == self.config.active() {
            self.stable = self.config.inactive();
            true
        } else {
            false
        }
    }

    /// Reports whether a sample taken at `now` would fall inside the lockout.
    #[must_use]
    pub fn phase(&self, now: Micros) -> DebouncePhase {
        match self.last_transition {
            Some(last) if now.wrapping_since(last) <= self.config.lockout() => {
                DebouncePhase::Locked
            }
            _ => DebouncePhase::Idle,
        }
    }

    /// Most recent raw sample, accepted or not.
    #[must_use]
    pub const fn raw_level(&self) -> Level {
        self.raw
    }

    /// Debounced level.
    #[must_use]
    pub const fn stable_level(&self) -> Level {
        self.stable
    }

    /// Timestamp of the last accepted transition.
    #[must_use]
    pub const fn last_transition(&self) -> Option<Micros> {
        self.last_transition
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &DebounceConfig {
        &self.config
    }
}

/// Interrupt-side producer: debounces edges and posts activations.
pub struct ButtonLatch<'a> {
    debouncer: Debouncer,
    mailbox: &'a ActionMailbox,
}

impl<'a> ButtonLatch<'a> {
    /// Creates a latch publishing into `mailbox`.
    #[must_use]
    pub fn new(config: DebounceConfig, mailbox: &'a ActionMailbox) -> Self {
        let debouncer = Debouncer::new(config);
        mailbox.publish_level(debouncer.stable_level());
        Self { debouncer, mailbox }
    }

    /// Handles one edge interrupt carrying the level sampled at `now`.
    ///
    /// Must only be called from a single, non-reentrant context.
    pub fn on_edge(&mut self, level: Level, now: Micros) -> SampleOutcome {
        if self.debouncer.config().trigger() == TriggerMode::Rising && self.debouncer.rearm(now) {
            self.mailbox.publish_level(self.debouncer.stable_level());
        }

        let outcome = self.debouncer.sample(level, now);
        let stats = self.mailbox.stats();
        match outcome {
            SampleOutcome::Bounced => stats.note_bounce(),
            SampleOutcome::Unchanged => {}
            SampleOutcome::Released => {
                stats.note_release();
                self.mailbox.publish_level(self.debouncer.stable_level());
            }
            SampleOutcome::Activated => {
                stats.note_activation();
                self.mailbox.publish_level(self.debouncer.stable_level());
                if self.mailbox.post(LatchedAction::new(now)) == PostOutcome::Coalesced {
                    stats.note_coalesced();
                }
            }
        }
        outcome
    }

    /// Read-only view of the debouncer.
    #[must_use]
    pub const fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }

    /// Mailbox this latch publishes into.
    #[must_use]
    pub const fn mailbox(&self) -> &'a ActionMailbox {
        self.mailbox
    }
}
