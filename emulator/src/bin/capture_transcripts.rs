use std::io;
use std::path::PathBuf;

#[path = "../command.rs"]
mod command;
#[path = "../panel.rs"]
mod panel;
#[path = "../session.rs"]
mod session;

use flicker_core::debounce::{DebounceConfig, TriggerMode};
use flicker_core::mailbox::ActionMailbox;
use session::{Session, SessionOptions};

const TRANSCRIPT_DIR: &str = "transcripts";

/// Scripted walk-throughs recorded for review.
const SCENARIOS: &[(&str, TriggerMode, &[&str])] = &[
    (
        "sweep",
        TriggerMode::Rising,
        &[
            "pot 0", "press", "release", "wait 60", "pot 512", "press", "release", "wait 60",
            "pot 1023", "press", "status",
        ],
    ),
    (
        "chatter",
        TriggerMode::AnyChange,
        &["pot 300", "bounce 8", "wait 45", "release", "wait 45", "bounce 8", "status"],
    ),
    (
        "lockout",
        TriggerMode::AnyChange,
        &["press", "wait 10", "release", "wait 100", "press", "release", "press", "status"],
    ),
];

fn main() -> io::Result<()> {
    for (name, trigger, script) in SCENARIOS {
        record(name, *trigger, script)?;
    }
    Ok(())
}

fn record(name: &str, trigger: TriggerMode, script: &[&str]) -> io::Result<()> {
    let mailbox = ActionMailbox::new();
    let options = SessionOptions {
        debounce: DebounceConfig::DEFAULT.with_trigger(trigger),
        transcript: Some(PathBuf::from(TRANSCRIPT_DIR).join(format!("{name}.log"))),
    };
    let mut session = Session::new(&mailbox, &options)?;
    for line in script {
        let _ = session.handle_command(line)?;
    }
    Ok(())
}
