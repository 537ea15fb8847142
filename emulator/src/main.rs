mod command;
mod panel;
mod session;

use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use flicker_core::debounce::TriggerMode;
use flicker_core::mailbox::ActionMailbox;
use session::{Session, SessionOptions};

const USAGE: &str =
    "Usage: flicker-emulator [--mode <rising|change>] [--lockout-ms <n>] [--transcript <path>]";

fn main() -> io::Result<()> {
    let options = parse_options(env::args().skip(1)).unwrap_or_else(|err| {
        eprintln!("{err}");
        eprintln!("{USAGE}");
        process::exit(2);
    });

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    let mailbox = ActionMailbox::new();
    let mut session = Session::new(&mailbox, &options)?;
    let mut line = String::new();

    writeln!(
        writer,
        "Flicker fusion meter emulator ready. Type `help` for commands or `exit` to quit."
    )?;

    loop {
        line.clear();
        write!(writer, "> ")?;
        writer.flush()?;

        let bytes_read = reader.read_line(&mut line)?;
        if bytes_read == 0 {
            writeln!(writer)?;
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if should_terminate(trimmed) {
            writeln!(writer, "Session closed.")?;
            break;
        }

        let responses = session.handle_command(trimmed)?;
        for response in responses {
            writeln!(writer, "{response}")?;
        }
    }

    Ok(())
}

fn should_terminate(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<SessionOptions, String> {
    let mut options = SessionOptions::default();

    while let Some(arg) = args.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) => (flag.to_owned(), Some(value.to_owned())),
            None => (arg, None),
        };
        let mut value = || {
            inline
                .clone()
                .or_else(|| args.next())
                .ok_or_else(|| format!("Expected value after {flag}"))
        };

        match flag.as_str() {
            "--mode" => {
                let trigger = parse_trigger(&value()?)?;
                options.debounce = options.debounce.with_trigger(trigger);
            }
            "--lockout-ms" => {
                let raw = value()?;
                let millis = raw
                    .parse::<u64>()
                    .map_err(|_| format!("Invalid lockout `{raw}`"))?;
                options.debounce = options.debounce.with_lockout(Duration::from_millis(millis));
            }
            "--transcript" => options.transcript = Some(PathBuf::from(value()?)),
            other => return Err(format!("Unknown option `{other}`")),
        }
    }

    Ok(options)
}

fn parse_trigger(tag: &str) -> Result<TriggerMode, String> {
    if tag.eq_ignore_ascii_case("rising") {
        Ok(TriggerMode::Rising)
    } else if tag.eq_ignore_ascii_case("change") {
        Ok(TriggerMode::AnyChange)
    } else {
        Err(format!("Unknown trigger mode `{tag}`"))
    }
}
