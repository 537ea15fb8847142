use core::time::Duration;

use flicker_core::debounce::{
    ButtonLatch, DebounceConfig, DebouncePhase, Debouncer, SampleOutcome, TriggerMode,
};
use flicker_core::mailbox::{ActionMailbox, LatchedAction};
use flicker_core::signal::Level;
use flicker_core::time::Micros;

const LOCKOUT: Duration = Duration::from_millis(2);

fn change_config() -> DebounceConfig {
    DebounceConfig::new(LOCKOUT, Level::High, TriggerMode::AnyChange)
}

fn ms(value: u32) -> Micros {
    Micros::new(value * 1_000)
}

#[test]
fn bounce_inside_lockout_leaves_single_pending_action() {
    let mailbox = ActionMailbox::new();
    let mut latch = ButtonLatch::new(change_config(), &mailbox);

    assert_eq!(latch.on_edge(Level::High, ms(0)), SampleOutcome::Activated);
    assert_eq!(latch.on_edge(Level::Low, ms(1)), SampleOutcome::Bounced);

    assert_eq!(latch.debouncer().stable_level(), Level::High);
    assert_eq!(mailbox.level(), Level::High);
    assert!(mailbox.is_pending());
    assert_eq!(mailbox.take(), Some(LatchedAction::new(ms(0))));
    assert_eq!(mailbox.take(), None);
}

#[test]
fn consume_clears_action_but_not_stable_level() {
    let mailbox = ActionMailbox::new();
    let mut latch = ButtonLatch::new(change_config(), &mailbox);

    latch.on_edge(Level::High, ms(5));
    assert!(mailbox.take().is_some());

    assert!(!mailbox.is_pending());
    assert_eq!(latch.debouncer().stable_level(), Level::High);
    assert_eq!(mailbox.level(), Level::High);
}

#[test]
fn rejected_change_does_not_touch_state() {
    let mut debouncer = Debouncer::new(change_config());
    debouncer.sample(Level::High, ms(10));

    for offset_us in [1, 500, 1_999, 2_000] {
        let now = Micros::new(10_000 + offset_us);
        assert_eq!(debouncer.phase(now), DebouncePhase::Locked);
        assert_eq!(debouncer.sample(Level::Low, now), SampleOutcome::Bounced);
        assert_eq!(debouncer.stable_level(), Level::High);
    }

    assert_eq!(debouncer.sample(Level::Low, Micros::new(12_001)), SampleOutcome::Released);
}

#[test]
fn full_press_release_cycle_with_chatter_reports_once_per_press() {
    let mailbox = ActionMailbox::new();
    let mut latch = ButtonLatch::new(change_config(), &mailbox);
    let mut reported = 0;

    let edges = [
        (Level::High, 0),
        (Level::Low, 300),
        (Level::High, 700),
        (Level::Low, 50_000),
        (Level::High, 50_400),
        (Level::Low, 50_900),
        (Level::High, 120_000),
    ];

    for (level, at) in edges {
        latch.on_edge(level, Micros::new(at));
        if mailbox.take().is_some() {
            reported += 1;
        }
    }

    assert_eq!(reported, 2);
    let stats = mailbox.stats().snapshot();
    assert_eq!(stats.activations, 2);
    assert_eq!(stats.releases, 1);
    assert_eq!(stats.bounces, 4);
}

#[test]
fn unconsumed_presses_coalesce() {
    let mailbox = ActionMailbox::new();
    let mut latch = ButtonLatch::new(change_config(), &mailbox);

    latch.on_edge(Level::High, ms(0));
    latch.on_edge(Level::Low, ms(10));
    latch.on_edge(Level::High, ms(20));

    assert_eq!(mailbox.take(), Some(LatchedAction::new(ms(20))));
    assert_eq!(mailbox.take(), None);
    assert_eq!(mailbox.stats().snapshot().coalesced, 1);
}

#[test]
fn lockout_spanning_counter_rollover() {
    let mut debouncer = Debouncer::new(change_config());
    let before_wrap = Micros::new(u32::MAX - 499);
    assert_eq!(debouncer.sample(Level::High, before_wrap), SampleOutcome::Activated);

    // 500us before the wrap plus 1000us after: 1.5ms elapsed, still locked.
    assert_eq!(debouncer.sample(Level::Low, Micros::new(1_000)), SampleOutcome::Bounced);
    // 500us + 1501us = 2.001ms elapsed.
    assert_eq!(debouncer.sample(Level::Low, Micros::new(1_501)), SampleOutcome::Released);
}

#[test]
fn rising_mode_ignores_hold_and_catches_next_press() {
    let mailbox = ActionMailbox::new();
    let config = change_config().with_trigger(TriggerMode::Rising);
    let mut latch = ButtonLatch::new(config, &mailbox);

    assert_eq!(latch.on_edge(Level::High, ms(0)), SampleOutcome::Activated);
    assert!(mailbox.take().is_some());

    assert_eq!(latch.on_edge(Level::High, ms(1)), SampleOutcome::Bounced);
    assert_eq!(latch.on_edge(Level::High, ms(300)), SampleOutcome::Activated);
    assert_eq!(mailbox.take(), Some(LatchedAction::new(ms(300))));
}

#[test]
fn rising_rearm_publishes_release_even_without_transition() {
    let mailbox = ActionMailbox::new();
    let config = change_config().with_trigger(TriggerMode::Rising);
    let mut latch = ButtonLatch::new(config, &mailbox);

    assert_eq!(latch.on_edge(Level::High, ms(0)), SampleOutcome::Activated);
    assert!(mailbox.take().is_some());

    // Edge delivered late: the line already reads released when sampled.
    assert_eq!(latch.on_edge(Level::Low, ms(10)), SampleOutcome::Unchanged);
    assert_eq!(latch.debouncer().stable_level(), Level::Low);
    assert_eq!(mailbox.level(), latch.debouncer().stable_level());
    assert!(!mailbox.is_pending());
}

#[test]
fn active_low_wiring_inverts_polarity() {
    let mailbox = ActionMailbox::new();
    let config = DebounceConfig::new(LOCKOUT, Level::Low, TriggerMode::AnyChange);
    let mut latch = ButtonLatch::new(config, &mailbox);

    assert_eq!(mailbox.level(), Level::High);
    assert_eq!(latch.on_edge(Level::Low, ms(0)), SampleOutcome::Activated);
    assert!(mailbox.take().is_some());
    assert_eq!(latch.on_edge(Level::High, ms(5)), SampleOutcome::Released);
    assert!(mailbox.take().is_none());
}
