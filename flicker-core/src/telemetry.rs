//! Telemetry event catalog and a fixed-capacity recorder.
//!
//! The polling loop records one entry per latched press so the firmware and
//! the emulator can show recent readings and how long each press waited in
//! the mailbox before being reported.

use core::{fmt, time::Duration};

use heapless::{HistoryBuf, OldestOrdered};

use crate::mapper::HalfPeriod;
use crate::report::FrequencyReport;
use crate::time::Micros;

/// Total number of telemetry entries retained in memory.
pub const TELEMETRY_RING_CAPACITY: usize = 16;

/// Identifier assigned to each recorded event.
pub type EventId = u32;

/// Discriminated telemetry events.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TelemetryEventKind {
    /// The polling loop took a pending action from the mailbox.
    ActionLatched,
    /// The report reached its sink.
    FrequencyReported,
    /// The sink returned an error; the press is not retried.
    ReportFailed,
}

impl fmt::Display for TelemetryEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryEventKind::ActionLatched => f.write_str("action-latched"),
            TelemetryEventKind::FrequencyReported => f.write_str("frequency-reported"),
            TelemetryEventKind::ReportFailed => f.write_str("report-failed"),
        }
    }
}

/// Details attached to report events.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ReportTelemetry {
    pub centihertz: u32,
    pub half_period: HalfPeriod,
    pub latency: Duration,
}

impl ReportTelemetry {
    /// Captures the interesting fields of `report`.
    #[must_use]
    pub const fn from_report(report: &FrequencyReport) -> Self {
        Self {
            centihertz: report.centihertz(),
            half_period: report.half_period(),
            latency: report.latency(),
        }
    }
}

/// Structured payloads attached to telemetry records.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TelemetryPayload {
    None,
    Report(ReportTelemetry),
}

/// Telemetry record stored in the ring buffer.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TelemetryRecord {
    pub id: EventId,
    pub timestamp: Micros,
    pub event: TelemetryEventKind,
    pub details: TelemetryPayload,
}

/// Telemetry ring buffer type alias.
pub type TelemetryRing<const CAPACITY: usize = TELEMETRY_RING_CAPACITY> =
    HistoryBuf<TelemetryRecord, CAPACITY>;

/// Records telemetry events into a fixed-size ring buffer.
pub struct TelemetryRecorder<const CAPACITY: usize = TELEMETRY_RING_CAPACITY> {
    ring: TelemetryRing<CAPACITY>,
    next_event_id: EventId,
}

impl<const CAPACITY: usize> TelemetryRecorder<CAPACITY> {
    /// Creates a new telemetry recorder with an empty history.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ring: HistoryBuf::new(),
            next_event_id: 0,
        }
    }

    /// Returns an iterator over the recorded telemetry in chronological order.
    pub fn oldest_first(&self) -> OldestOrdered<'_, TelemetryRecord> {
        self.ring.oldest_ordered()
    }

    /// Returns the most recent telemetry record, if available.
    pub fn latest(&self) -> Option<&TelemetryRecord> {
        self.ring.recent()
    }

    /// Returns the number of records currently stored.
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Returns `true` when no telemetry records are stored.
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Records a pending action taken from the mailbox, stamped with the
    /// time the debouncer accepted it.
    pub fn record_latched(&mut self, latched_at: Micros) -> EventId {
        self.record(TelemetryEventKind::ActionLatched, TelemetryPayload::None, latched_at)
    }

    /// Records a delivered (or failed) report.
    pub fn record_report(&mut self, report: &FrequencyReport, delivered: bool) -> EventId {
        let event = if delivered {
            TelemetryEventKind::FrequencyReported
        } else {
            TelemetryEventKind::ReportFailed
        };
        self.record(
            event,
            TelemetryPayload::Report(ReportTelemetry::from_report(report)),
            report.reported_at(),
        )
    }

    /// Records an arbitrary telemetry event with the supplied payload.
    pub fn record(
        &mut self,
        event: TelemetryEventKind,
        payload: TelemetryPayload,
        timestamp: Micros,
    ) -> EventId {
        let id = self.next_event_id;
        self.next_event_id = self.next_event_id.wrapping_add(1);

        self.ring.write(TelemetryRecord {
            id,
            timestamp,
            event,
            details: payload,
        });

        id
    }
}

impl<const CAPACITY: usize> Default for TelemetryRecorder<CAPACITY> {
    fn default() -> Self {
        Self::new()
    }
}
