#![cfg_attr(not(target_os = "none"), allow(dead_code))]

//! One-line text reports over a blocking serial writer.

use core::fmt;

use embedded_io::Write;
use flicker_core::report::{FrequencyReport, ReportLineError, ReportSink, format_report_line};

const LINE_ENDING: &[u8] = b"\r\n";

/// Failure writing a report line.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SerialError<E> {
    /// The report did not fit the line buffer.
    Format(ReportLineError),
    /// The transport rejected the bytes.
    Write(E),
}

impl<E: fmt::Debug> fmt::Display for SerialError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerialError::Format(err) => write!(f, "{err}"),
            SerialError::Write(err) => write!(f, "serial write failed: {err:?}"),
        }
    }
}

/// Writes each report as a CRLF-terminated line.
pub struct SerialSink<W> {
    writer: W,
    lines: u32,
}

impl<W> SerialSink<W> {
    /// Wraps a blocking writer, typically the USART transmitter.
    pub const fn new(writer: W) -> Self {
        Self { writer, lines: 0 }
    }

    /// Number of lines written successfully.
    pub const fn lines(&self) -> u32 {
        self.lines
    }
}

impl<W: Write> ReportSink for SerialSink<W> {
    type Error = SerialError<W::Error>;

    fn report(&mut self, report: &FrequencyReport) -> Result<(), Self::Error> {
        let line = format_report_line(report).map_err(SerialError::Format)?;
        self.writer
            .write_all(line.as_bytes())
            .map_err(SerialError::Write)?;
        self.writer
            .write_all(LINE_ENDING)
            .map_err(SerialError::Write)?;
        self.writer.flush().map_err(SerialError::Write)?;
        self.lines = self.lines.wrapping_add(1);
        Ok(())
    }
}
