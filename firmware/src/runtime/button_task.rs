use embassy_stm32::exti::ExtiInput;
use flicker_core::debounce::{ButtonLatch, SampleOutcome, TriggerMode};
use flicker_core::mailbox::ActionMailbox;
use flicker_core::signal::Level;
use flicker_core::time::Clock;

use crate::clock::EmbassyClock;
use crate::config;

/// Feeds button edges to the debouncer. Runs at interrupt priority, so each
/// edge is latched before the polling loop resumes.
#[embassy_executor::task]
pub async fn run(mut button: ExtiInput<'static>, mailbox: &'static ActionMailbox) -> ! {
    let clock = EmbassyClock;
    let mut latch = ButtonLatch::new(config::BUTTON_LATCH, mailbox);

    loop {
        match (config::BUTTON_LATCH.trigger(), config::BUTTON_LATCH.active()) {
            (TriggerMode::Rising, Level::High) => button.wait_for_rising_edge().await,
            (TriggerMode::Rising, Level::Low) => button.wait_for_falling_edge().await,
            (TriggerMode::AnyChange, _) => button.wait_for_any_edge().await,
        }

        let now = clock.now();
        let level = Level::from_high(button.is_high());
        match latch.on_edge(level, now) {
            SampleOutcome::Activated => defmt::debug!("button: latched t={}us", now.ticks()),
            SampleOutcome::Bounced => defmt::trace!("button: bounce t={}us", now.ticks()),
            SampleOutcome::Released | SampleOutcome::Unchanged => {}
        }
    }
}
