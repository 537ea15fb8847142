use std::convert::Infallible;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use flicker_core::controller::FlickerController;
use flicker_core::debounce::{ButtonLatch, DebounceConfig, DebouncePhase, SampleOutcome};
use flicker_core::mailbox::ActionMailbox;
use flicker_core::mapper::{AdcSample, map_to_half_period};
use flicker_core::report::{FanOut, FrequencyReport, ReportLineError, ReportSink, format_report_line};
use flicker_core::segments::SegmentSink;
use flicker_core::signal::{LedOutput, Level};
use flicker_core::time::{Clock, ManualClock, Micros};

use crate::command::{Command, CommandParser};
use crate::panel::AsciiPanel;

/// Simulated time between two iterations of the polling loop.
pub const POLL_INTERVAL: Duration = Duration::from_micros(250);
/// Spacing of the edges generated by `bounce`.
pub const CHATTER_INTERVAL: Duration = Duration::from_micros(500);

pub const HELP_TOPICS: &[(&str, &str)] = &[
    ("pot", "pot <0-1023>    - move the potentiometer wiper"),
    ("press", "press           - close the button contact"),
    ("release", "release         - open the button contact"),
    (
        "bounce",
        "bounce <n>      - press with <n> release/press chatter pairs 500us apart",
    ),
    ("wait", "wait <ms>       - let the polling loop run for <ms> milliseconds"),
    ("status", "status          - show blink rate, button state and latch counters"),
    ("help", "help [topic]    - show help for a command"),
];

/// Session settings chosen on the command line.
#[derive(Clone, Debug)]
pub struct SessionOptions {
    pub debounce: DebounceConfig,
    pub transcript: Option<PathBuf>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            debounce: DebounceConfig::DEFAULT,
            transcript: None,
        }
    }
}

/// LED stand-in counting level changes.
#[derive(Debug, Default)]
pub struct HostLed {
    level: Level,
    toggles: u32,
}

impl HostLed {
    pub fn level(&self) -> Level {
        self.level
    }

    pub fn toggles(&self) -> u32 {
        self.toggles
    }
}

impl LedOutput for HostLed {
    type Error = Infallible;

    fn set_level(&mut self, level: Level) -> Result<(), Self::Error> {
        if level != self.level {
            self.toggles = self.toggles.wrapping_add(1);
        }
        self.level = level;
        Ok(())
    }
}

/// Serial console stand-in; lines are drained into the command output.
#[derive(Debug, Default)]
pub struct ConsoleSink {
    pending: Vec<String>,
}

impl ReportSink for ConsoleSink {
    type Error = ReportLineError;

    fn report(&mut self, report: &FrequencyReport) -> Result<(), Self::Error> {
        let line = format_report_line(report)?;
        self.pending.push(line.as_str().to_owned());
        Ok(())
    }
}

type Sinks = FanOut<ConsoleSink, SegmentSink<AsciiPanel>>;

/// Simulated meter driven by operator commands.
///
/// Time only moves when a command asks for it, so every transcript is
/// reproducible.
pub struct Session<'a> {
    clock: ManualClock,
    latch: ButtonLatch<'a>,
    controller: FlickerController<'a, HostLed>,
    sinks: Sinks,
    pot: AdcSample,
    line: Level,
    transcript: Option<TranscriptLogger>,
}

impl<'a> Session<'a> {
    pub fn new(mailbox: &'a ActionMailbox, options: &SessionOptions) -> io::Result<Self> {
        let clock = ManualClock::default();
        let latch = ButtonLatch::new(options.debounce, mailbox);
        let controller = match FlickerController::new(HostLed::default(), mailbox, clock.now()) {
            Ok(controller) => controller,
            Err(never) => match never {},
        };
        let transcript = options
            .transcript
            .as_deref()
            .map(|path| TranscriptLogger::create(path, &options.debounce))
            .transpose()?;

        Ok(Self {
            clock,
            latch,
            controller,
            sinks: FanOut::new(ConsoleSink::default(), SegmentSink::new(AsciiPanel::default())),
            pot: AdcSample::MIN,
            line: options.debounce.inactive(),
            transcript,
        })
    }

    pub fn handle_command(&mut self, line: &str) -> io::Result<Vec<String>> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        let now = self.clock.now();
        self.record(now, TranscriptRole::Host, &[trimmed.to_owned()])?;

        let lines = match CommandParser::parse(trimmed) {
            Ok(command) => self.execute(command),
            Err(err) => vec![
                format!("error: {err}"),
                "Type `help` for available commands.".to_owned(),
            ],
        };

        let now = self.clock.now();
        self.record(now, TranscriptRole::Emulator, &lines)?;
        Ok(lines)
    }

    pub fn led(&self) -> &HostLed {
        self.controller.led()
    }

    pub fn panel(&self) -> &AsciiPanel {
        self.sinks.second().display()
    }

    fn execute(&mut self, command: Command<'_>) -> Vec<String> {
        let mut out = Vec::new();
        match command {
            Command::Pot(value) => {
                self.pot = AdcSample::new(value);
                let half_period = map_to_half_period(self.pot);
                out.push(format!(
                    "pot = {value} -> half-period {half_period} ({:.2} Hz)",
                    half_period.hertz()
                ));
                self.poll(&mut out);
            }
            Command::Press => {
                let active = self.latch.debouncer().config().active();
                self.drive_line(active, &mut out);
                self.poll(&mut out);
            }
            Command::Release => {
                let inactive = self.latch.debouncer().config().inactive();
                self.drive_line(inactive, &mut out);
                self.poll(&mut out);
            }
            Command::Bounce(pairs) => self.bounce(pairs, &mut out),
            Command::Wait(millis) => self.wait(millis, &mut out),
            Command::Status => self.status(&mut out),
            Command::Help(topic) => help(topic, &mut out),
        }
        out
    }

    /// Changes the raw button line and delivers the interrupt the input
    /// peripheral would raise for it, if any.
    fn drive_line(&mut self, level: Level, out: &mut Vec<String>) -> Option<SampleOutcome> {
        let previous = self.line;
        self.line = level;

        let config = *self.latch.debouncer().config();
        if !config.trigger().fires(previous, level, config.active()) {
            if previous != level {
                out.push(format!("button: line {level} (no interrupt)"));
            }
            return None;
        }

        let now = self.clock.now();
        let outcome = self.latch.on_edge(level, now);
        let verdict = match outcome {
            SampleOutcome::Activated => "press accepted",
            SampleOutcome::Released => "release accepted",
            SampleOutcome::Bounced => "bounce ignored",
            SampleOutcome::Unchanged => "no change",
        };
        out.push(format!("button: line {level} at t={now} -> {verdict}"));
        Some(outcome)
    }

    fn bounce(&mut self, pairs: u16, out: &mut Vec<String>) {
        let config = *self.latch.debouncer().config();
        let mut edges = Vec::new();
        edges.push(config.active());
        for _ in 0..pairs {
            edges.push(config.inactive());
            edges.push(config.active());
        }

        let mut quiet = Vec::new();
        let mut accepted = 0_u32;
        let mut rejected = 0_u32;
        for (index, level) in edges.into_iter().enumerate() {
            if index > 0 {
                self.advance(CHATTER_INTERVAL, out);
            }
            match self.drive_line(level, &mut quiet) {
                Some(SampleOutcome::Bounced) => rejected += 1,
                Some(SampleOutcome::Activated | SampleOutcome::Released) => accepted += 1,
                Some(SampleOutcome::Unchanged) | None => {}
            }
            self.poll(out);
        }

        out.push(format!(
            "bounce: {} edges, {accepted} accepted, {rejected} ignored",
            u32::from(pairs) * 2 + 1
        ));
    }

    fn wait(&mut self, millis: u32, out: &mut Vec<String>) {
        let toggles_before = self.led().toggles();
        self.advance(Duration::from_millis(u64::from(millis)), out);
        out.push(format!(
            "waited {millis} ms: LED toggled {} times, now {}",
            self.led().toggles().wrapping_sub(toggles_before),
            self.led().level()
        ));
    }

    /// Runs the polling loop every [`POLL_INTERVAL`] until `span` has elapsed.
    fn advance(&mut self, span: Duration, out: &mut Vec<String>) {
        let mut remaining = span;
        while !remaining.is_zero() {
            let step = remaining.min(POLL_INTERVAL);
            self.clock.advance(step);
            remaining -= step;
            self.poll(out);
        }
    }

    fn poll(&mut self, out: &mut Vec<String>) {
        let now = self.clock.now();
        let reported = match self.controller.poll(now, self.pot, &mut self.sinks) {
            Ok(outcome) => outcome.report.is_some(),
            Err(err) => {
                out.push(format!("report failed: {err}"));
                false
            }
        };

        out.append(&mut self.sinks.first_mut().pending);
        if reported {
            out.extend(self.panel().render());
        }
    }

    fn status(&self, out: &mut Vec<String>) {
        let oscillator = self.controller.oscillator();
        let debouncer = self.latch.debouncer();
        let config = debouncer.config();
        let stats = self.latch.mailbox().stats().snapshot();
        let now = self.clock.now();

        out.push(format!("clock: t={now}"));
        out.push(format!(
            "pot: {} -> half-period {} ({:.2} Hz)",
            self.pot.value(),
            map_to_half_period(self.pot),
            map_to_half_period(self.pot).hertz()
        ));
        out.push(format!(
            "led: {} ({} toggles, blinking at half-period {})",
            self.led().level(),
            self.led().toggles(),
            oscillator.half_period()
        ));
        let phase = match debouncer.phase(now) {
            DebouncePhase::Idle => "idle",
            DebouncePhase::Locked => "locked out",
        };
        out.push(format!(
            "button: line {}, debounced {}, {phase} (lockout {} ms, {:?} trigger, active {})",
            self.line,
            debouncer.stable_level(),
            config.lockout().as_millis(),
            config.trigger(),
            config.active()
        ));
        out.push(format!(
            "latch: {} presses, {} releases, {} bounces ignored, {} coalesced, pending={}",
            stats.activations,
            stats.releases,
            stats.bounces,
            stats.coalesced,
            self.latch.mailbox().is_pending()
        ));
        match self.controller.last_report() {
            Some(report) => {
                out.push(format!(
                    "last report: {:.2} Hz (latched t={}, waited {} us, panel updated {} times)",
                    report.hertz(),
                    report.latched_at(),
                    report.latency().as_micros(),
                    self.panel().updates()
                ));
                out.push(format!("panel: [{}]", self.panel().frame()));
                out.extend(self.panel().render());
            }
            None => out.push("last report: none".to_owned()),
        }
    }
}

fn help(topic: Option<&str>, out: &mut Vec<String>) {
    match topic {
        Some(target) if !target.is_empty() => {
            if let Some((_, detail)) = HELP_TOPICS
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(target))
            {
                out.push((*detail).to_owned());
            } else {
                out.push(format!("No help available for `{target}`."));
                out.push(format!("Available topics: {}", help_topic_list()));
            }
        }
        _ => {
            out.push("Available commands:".to_owned());
            for (_, detail) in HELP_TOPICS {
                out.push(format!("  {detail}"));
            }
            out.push("Type `help <topic>` for a specific command.".to_owned());
        }
    }
}

fn help_topic_list() -> String {
    HELP_TOPICS
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(", ")
}

impl Session<'_> {
    fn record(&mut self, at: Micros, role: TranscriptRole, lines: &[String]) -> io::Result<()> {
        match self.transcript.as_mut() {
            Some(transcript) => transcript.append(at, role, lines),
            None => Ok(()),
        }
    }
}

struct TranscriptLogger {
    writer: BufWriter<File>,
}

impl TranscriptLogger {
    fn create(path: &Path, debounce: &DebounceConfig) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        let mut logger = Self {
            writer: BufWriter::new(file),
        };
        writeln!(logger.writer, "# Flicker fusion meter emulator transcript")?;
        writeln!(
            logger.writer,
            "# lockout {} ms, {:?} trigger; timestamps are simulated milliseconds",
            debounce.lockout().as_millis(),
            debounce.trigger()
        )?;
        writeln!(logger.writer)?;
        logger.writer.flush()?;
        Ok(logger)
    }

    fn append(&mut self, at: Micros, role: TranscriptRole, lines: &[String]) -> io::Result<()> {
        for line in lines {
            writeln!(
                self.writer,
                "[+{:>6}.{:03} ms] {} {line}",
                at.ticks() / 1_000,
                at.ticks() % 1_000,
                role.prefix()
            )?;
        }
        self.writer.flush()
    }
}

#[derive(Clone, Copy)]
enum TranscriptRole {
    Host,
    Emulator,
}

impl TranscriptRole {
    fn prefix(self) -> &'static str {
        match self {
            TranscriptRole::Host => "HOST>",
            TranscriptRole::Emulator => "EMU <",
        }
    }
}
