//! Operator command grammar for the emulator REPL.

use std::fmt;

use flicker_core::mapper::ADC_MAX;
use winnow::ascii::{Caseless, dec_uint, space0, space1};
use winnow::combinator::{alt, opt, preceded};
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::token::rest;

/// Largest `bounce` count accepted in one command.
pub const MAX_CHATTER_PAIRS: u16 = 1_000;
/// Longest simulated `wait`, ten minutes.
pub const MAX_WAIT_MILLIS: u32 = 600_000;

/// One parsed operator command.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Command<'a> {
    Pot(u16),
    Press,
    Release,
    Bounce(u16),
    Wait(u32),
    Status,
    Help(Option<&'a str>),
}

/// Rejected command line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CommandError {
    /// The line did not match any command.
    Syntax,
    /// `pot` value above the converter's full scale.
    PotOutOfRange(u16),
    /// `bounce` count above [`MAX_CHATTER_PAIRS`].
    TooManyBounces(u16),
    /// `wait` longer than [`MAX_WAIT_MILLIS`].
    WaitTooLong(u32),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Syntax => f.write_str("unrecognized command"),
            CommandError::PotOutOfRange(value) => {
                write!(f, "pot value {value} out of range (0-{ADC_MAX})")
            }
            CommandError::TooManyBounces(count) => {
                write!(f, "bounce count {count} exceeds {MAX_CHATTER_PAIRS}")
            }
            CommandError::WaitTooLong(millis) => {
                write!(f, "wait of {millis} ms exceeds {MAX_WAIT_MILLIS} ms")
            }
        }
    }
}

/// Command parser built on top of `winnow`.
pub struct CommandParser;

impl CommandParser {
    /// Parses a trimmed command line.
    pub fn parse(input: &str) -> Result<Command<'_>, CommandError> {
        let command = Self::command()
            .parse(input.trim())
            .map_err(|_| CommandError::Syntax)?;

        match command {
            Command::Pot(value) if value > ADC_MAX => Err(CommandError::PotOutOfRange(value)),
            Command::Bounce(count) if count > MAX_CHATTER_PAIRS => {
                Err(CommandError::TooManyBounces(count))
            }
            Command::Wait(millis) if millis > MAX_WAIT_MILLIS => {
                Err(CommandError::WaitTooLong(millis))
            }
            other => Ok(other),
        }
    }

    fn command<'a>() -> impl Parser<&'a str, Command<'a>, ContextError> {
        move |input: &mut &'a str| {
            let command = alt((
                preceded((Caseless("pot"), space1), dec_uint).map(Command::Pot),
                Caseless("press").value(Command::Press),
                Caseless("release").value(Command::Release),
                preceded((Caseless("bounce"), space1), dec_uint).map(Command::Bounce),
                preceded((Caseless("wait"), space1), dec_uint).map(Command::Wait),
                Caseless("status").value(Command::Status),
                preceded(Caseless("help"), opt(preceded(space1, rest)))
                    .map(|topic: Option<&'a str>| Command::Help(topic.map(str::trim))),
            ))
            .parse_next(input)?;

            space0.parse_next(input)?;
            Ok(command)
        }
    }
}
