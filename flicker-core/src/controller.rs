//! One iteration of the busy polling loop.
//!
//! The firmware calls [`FlickerController::poll`] from a tight loop that
//! never blocks: map the potentiometer to a half-period, let the oscillator
//! toggle the LED if it is due, then take at most one pending press from the
//! mailbox and report it. The controller only ever reads the mailbox word; the
//! debouncer itself stays private to the interrupt context.

use core::fmt;

use crate::mailbox::ActionMailbox;
use crate::mapper::{AdcSample, HalfPeriod, map_to_half_period};
use crate::oscillator::Oscillator;
use crate::report::{FrequencyReport, ReportSink};
use crate::signal::{Level, LedOutput};
use crate::telemetry::TelemetryRecorder;
use crate::time::Micros;

/// Failure raised by one of the controller's collaborators.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PollError<L, S> {
    /// Driving the LED failed.
    Led(L),
    /// The report sink rejected a report; the press is not retried.
    Sink(S),
}

impl<L: fmt::Display, S: fmt::Display> fmt::Display for PollError<L, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollError::Led(err) => write!(f, "led output: {err}"),
            PollError::Sink(err) => write!(f, "report sink: {err}"),
        }
    }
}

/// What a single poll did.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct PollOutcome {
    /// New LED level, if the oscillator toggled.
    pub toggled: Option<Level>,
    /// Report handed to the sink, if a press was pending.
    pub report: Option<FrequencyReport>,
}

/// Polling-loop consumer tying the mapper, oscillator and mailbox together.
pub struct FlickerController<'a, L> {
    oscillator: Oscillator,
    led: L,
    mailbox: &'a ActionMailbox,
    telemetry: TelemetryRecorder,
    last_report: Option<FrequencyReport>,
}

impl<'a, L: LedOutput> FlickerController<'a, L> {
    /// Creates a controller with the LED off, started at `now`.
    ///
    /// # Errors
    ///
    /// Returns the LED error if the initial level could not be applied.
    pub fn new(mut led: L, mailbox: &'a ActionMailbox, now: Micros) -> Result<Self, L::Error> {
        let oscillator = Oscillator::new(Level::Low, now, HalfPeriod::default());
        led.set_level(oscillator.level())?;
        Ok(Self {
            oscillator,
            led,
            mailbox,
            telemetry: TelemetryRecorder::new(),
            last_report: None,
        })
    }

    /// Runs one loop iteration.
    ///
    /// # Errors
    ///
    /// Returns [`PollError::Led`] if the LED could not be driven and
    /// [`PollError::Sink`] if the sink rejected the report. In the latter case
    /// the press has already been consumed.
    pub fn poll<S: ReportSink>(
        &mut self,
        now: Micros,
        sample: AdcSample,
        sink: &mut S,
    ) -> Result<PollOutcome, PollError<L::Error, S::Error>> {
        let half_period = map_to_half_period(sample);

        let toggled = self.oscillator.tick(now, half_period);
        if let Some(level) = toggled {
            self.led.set_level(level).map_err(PollError::Led)?;
        }

        let Some(action) = self.mailbox.take() else {
            return Ok(PollOutcome {
                toggled,
                report: None,
            });
        };

        self.telemetry.record_latched(action.at());
        let report = FrequencyReport::new(half_period, action.at(), now);
        let delivered = sink.report(&report);
        self.telemetry.record_report(&report, delivered.is_ok());
        delivered.map_err(PollError::Sink)?;
        self.last_report = Some(report);

        Ok(PollOutcome {
            toggled,
            report: Some(report),
        })
    }

    /// Oscillator state.
    #[must_use]
    pub const fn oscillator(&self) -> &Oscillator {
        &self.oscillator
    }

    /// Most recent successfully delivered report.
    #[must_use]
    pub const fn last_report(&self) -> Option<FrequencyReport> {
        self.last_report
    }

    /// Telemetry recorded so far.
    #[must_use]
    pub const fn telemetry(&self) -> &TelemetryRecorder {
        &self.telemetry
    }

    /// Borrow of the LED driver.
    #[must_use]
    pub const fn led(&self) -> &L {
        &self.led
    }

    /// Mailbox this controller consumes from.
    #[must_use]
    pub const fn mailbox(&self) -> &'a ActionMailbox {
        self.mailbox
    }
}

#[cfg(test)]
mod tests {
    use core::convert::Infallible;
    use core::time::Duration;

    use super::*;
    use crate::mailbox::LatchedAction;
    use crate::mapper::{MAX_HALF_PERIOD, MIN_HALF_PERIOD};
    use crate::telemetry::TelemetryEventKind;

    #[derive(Default)]
    struct LedStub {
        level: Option<Level>,
        writes: usize,
    }

    impl LedOutput for LedStub {
        type Error = Infallible;

        fn set_level(&mut self, level: Level) -> Result<(), Self::Error> {
            self.level = Some(level);
            self.writes += 1;
            Ok(())
        }
    }

    #[derive(Default)]
    struct SinkStub {
        reports: heapless::Vec<FrequencyReport, 4>,
        fail: bool,
    }

    impl ReportSink for SinkStub {
        type Error = &'static str;

        fn report(&mut self, report: &FrequencyReport) -> Result<(), Self::Error> {
            if self.fail {
                return Err("serial down");
            }
            self.reports.push(*report).map_err(|_| "full")
        }
    }

    fn at(micros: u32) -> Micros {
        Micros::new(micros)
    }

    #[test]
    fn new_drives_led_low() {
        let mailbox = ActionMailbox::new();
        let controller = FlickerController::new(LedStub::default(), &mailbox, at(0)).unwrap();
        assert_eq!(controller.led().level, Some(Level::Low));
    }

    #[test]
    fn idle_poll_only_ticks_oscillator() {
        let mailbox = ActionMailbox::new();
        let mut controller = FlickerController::new(LedStub::default(), &mailbox, at(0)).unwrap();
        let mut sink = SinkStub::default();

        let outcome = controller.poll(at(5_001), AdcSample::MIN, &mut sink).unwrap();
        assert_eq!(outcome.toggled, Some(Level::High));
        assert_eq!(outcome.report, None);
        assert_eq!(controller.led().level, Some(Level::High));
        assert_eq!(controller.oscillator().half_period(), MIN_HALF_PERIOD);
    }

    #[test]
    fn pending_press_is_reported_once() {
        let mailbox = ActionMailbox::new();
        let mut controller = FlickerController::new(LedStub::default(), &mailbox, at(0)).unwrap();
        let mut sink = SinkStub::default();

        mailbox.post(LatchedAction::new(at(100)));
        let outcome = controller.poll(at(150), AdcSample::MAX, &mut sink).unwrap();
        let report = outcome.report.unwrap();
        assert_eq!(report.half_period(), MAX_HALF_PERIOD);
        assert_eq!(report.latency(), Duration::from_micros(50));

        assert!(controller.poll(at(200), AdcSample::MAX, &mut sink).unwrap().report.is_none());
        assert_eq!(sink.reports.len(), 1);
        assert_eq!(controller.last_report(), Some(report));
    }

    #[test]
    fn sink_failure_consumes_press() {
        let mailbox = ActionMailbox::new();
        let mut controller = FlickerController::new(LedStub::default(), &mailbox, at(0)).unwrap();
        let mut sink = SinkStub {
            fail: true,
            ..SinkStub::default()
        };

        mailbox.post(LatchedAction::new(at(10)));
        let result = controller.poll(at(20), AdcSample::MIN, &mut sink);
        assert_eq!(result, Err(PollError::Sink("serial down")));
        assert!(!mailbox.is_pending());
        assert_eq!(controller.last_report(), None);
        assert_eq!(
            controller.telemetry().latest().map(|record| record.event),
            Some(TelemetryEventKind::ReportFailed)
        );

        sink.fail = false;
        let outcome = controller.poll(at(30), AdcSample::MIN, &mut sink).unwrap();
        assert!(outcome.report.is_none());
    }
}
