//! Frequency reports and the sinks that render them.

use core::fmt::{self, Write as _};
use core::time::Duration;

use heapless::String;

use crate::mapper::HalfPeriod;
use crate::time::Micros;

/// Capacity of a rendered report line, excluding the line terminator.
pub const REPORT_LINE_CAPACITY: usize = 64;

/// Rendered text line.
pub type ReportLine = String<REPORT_LINE_CAPACITY>;

/// Frequency captured for one confirmed button press.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FrequencyReport {
    half_period: HalfPeriod,
    latched_at: Micros,
    reported_at: Micros,
}

impl FrequencyReport {
    /// Creates a report for `half_period`, latched at `latched_at`.
    #[must_use]
    pub const fn new(half_period: HalfPeriod, latched_at: Micros, reported_at: Micros) -> Self {
        Self {
            half_period,
            latched_at,
            reported_at,
        }
    }

    /// Half-period in effect when the report was built.
    #[must_use]
    pub const fn half_period(&self) -> HalfPeriod {
        self.half_period
    }

    /// Blink frequency in hertz.
    #[must_use]
    pub fn hertz(&self) -> f32 {
        self.half_period.hertz()
    }

    /// Blink frequency in hundredths of a hertz.
    #[must_use]
    pub const fn centihertz(&self) -> u32 {
        self.half_period.centihertz()
    }

    /// When the press was accepted by the debouncer.
    #[must_use]
    pub const fn latched_at(&self) -> Micros {
        self.latched_at
    }

    /// When the polling loop picked the press up.
    #[must_use]
    pub const fn reported_at(&self) -> Micros {
        self.reported_at
    }

    /// Delay between latch and report.
    #[must_use]
    pub const fn latency(&self) -> Duration {
        self.reported_at.wrapping_since(self.latched_at)
    }
}

impl fmt::Display for FrequencyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Flicker fusion threshold frequency: {:.2}Hz", self.hertz())
    }
}

/// The report did not fit in [`REPORT_LINE_CAPACITY`] bytes.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ReportLineError;

impl fmt::Display for ReportLineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("report line overflow")
    }
}

/// Renders `report` as the one-line serial message.
///
/// # Errors
///
/// Returns [`ReportLineError`] if the text exceeds the line buffer.
pub fn format_report_line(report: &FrequencyReport) -> Result<ReportLine, ReportLineError> {
    let mut line = ReportLine::new();
    write!(line, "{report}").map_err(|_| ReportLineError)?;
    Ok(line)
}

/// Consumer of frequency reports.
pub trait ReportSink {
    /// Transport-specific error type.
    type Error;

    /// Renders one report. Called exactly once per latched press.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the report could not be delivered.
    fn report(&mut self, report: &FrequencyReport) -> Result<(), Self::Error>;
}

impl<T: ReportSink + ?Sized> ReportSink for &mut T {
    type Error = T::Error;

    fn report(&mut self, report: &FrequencyReport) -> Result<(), Self::Error> {
        (**self).report(report)
    }
}

/// Error from one side of a [`FanOut`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FanOutError<A, B> {
    First(A),
    Second(B),
}

impl<A: fmt::Display, B: fmt::Display> fmt::Display for FanOutError<A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FanOutError::First(err) => write!(f, "first sink: {err}"),
            FanOutError::Second(err) => write!(f, "second sink: {err}"),
        }
    }
}

/// Forwards every report to two sinks, e.g. serial text and a display.
///
/// Both sinks are always attempted; the first failure is returned.
pub struct FanOut<A, B> {
    first: A,
    second: B,
}

impl<A, B> FanOut<A, B> {
    /// Pairs two sinks.
    #[must_use]
    pub const fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    /// First sink.
    #[must_use]
    pub fn first(&self) -> &A {
        &self.first
    }

    /// Second sink.
    #[must_use]
    pub fn second(&self) -> &B {
        &self.second
    }

    pub fn first_mut(&mut self) -> &mut A {
        &mut self.first
    }

    pub fn second_mut(&mut self) -> &mut B {
        &mut self.second
    }

    /// Splits the pair back apart.
    #[must_use]
    pub fn into_inner(self) -> (A, B) {
        (self.first, self.second)
    }
}

impl<A: ReportSink, B: ReportSink> ReportSink for FanOut<A, B> {
    type Error = FanOutError<A::Error, B::Error>;

    fn report(&mut self, report: &FrequencyReport) -> Result<(), Self::Error> {
        let first = self.first.report(report);
        let second = self.second.report(report);
        first.map_err(FanOutError::First)?;
        second.map_err(FanOutError::Second)
    }
}
