//! Console mirroring for the controller's telemetry ring.
//!
//! The core records every latched press and its report into a small ring.
//! The polling loop hands that ring to [`TelemetryLog::drain`] after each
//! poll so new entries reach defmt on the target (or stdout on the host)
//! without the core depending on a logging backend.

#![cfg_attr(not(target_os = "none"), allow(dead_code))]

use flicker_core::telemetry::{
    EventId, TelemetryEventKind, TelemetryPayload, TelemetryRecord, TelemetryRecorder,
};

use crate::config::BoardPins;

/// Tracks which telemetry records were already mirrored.
#[derive(Debug, Default)]
pub struct TelemetryLog {
    next_id: EventId,
}

impl TelemetryLog {
    pub const fn new() -> Self {
        Self { next_id: 0 }
    }

    /// Emits every record newer than the previous drain. Returns how many
    /// records were emitted.
    pub fn drain<const CAPACITY: usize>(&mut self, recorder: &TelemetryRecorder<CAPACITY>) -> usize {
        let mut emitted = 0;
        for record in recorder.oldest_first() {
            if record.id.wrapping_sub(self.next_id) > EventId::MAX / 2 {
                continue;
            }
            emit_record(record);
            self.next_id = record.id.wrapping_add(1);
            emitted += 1;
        }
        emitted
    }
}

fn emit_record(record: &TelemetryRecord) {
    let timestamp_us = record.timestamp.ticks();
    let label = event_label(record.event);
    match record.details {
        TelemetryPayload::Report(details) => {
            #[allow(clippy::cast_possible_truncation)]
            let latency_us = details.latency.as_micros() as u32;
            emit_report(
                label,
                timestamp_us,
                details.centihertz,
                details.half_period.as_micros(),
                latency_us,
            );
        }
        TelemetryPayload::None => emit_event(label, timestamp_us),
    }
}

const fn event_label(event: TelemetryEventKind) -> &'static str {
    match event {
        TelemetryEventKind::ActionLatched => "latched",
        TelemetryEventKind::FrequencyReported => "reported",
        TelemetryEventKind::ReportFailed => "report-failed",
    }
}

#[cfg(target_os = "none")]
fn emit_event(label: &'static str, timestamp_us: u32) {
    defmt::debug!("telemetry:button {} t={}us", label, timestamp_us);
}

#[cfg(not(target_os = "none"))]
fn emit_event(label: &'static str, timestamp_us: u32) {
    println!("telemetry:button {label} t={timestamp_us}us");
}

#[cfg(target_os = "none")]
fn emit_report(label: &'static str, timestamp_us: u32, centihertz: u32, half_period_us: u32, latency_us: u32) {
    defmt::info!(
        "telemetry:report {} t={}us f={}cHz half={}us wait={}us",
        label,
        timestamp_us,
        centihertz,
        half_period_us,
        latency_us
    );
}

#[cfg(not(target_os = "none"))]
fn emit_report(label: &'static str, timestamp_us: u32, centihertz: u32, half_period_us: u32, latency_us: u32) {
    println!(
        "telemetry:report {label} t={timestamp_us}us f={}.{:02}Hz half={half_period_us}us wait={latency_us}us",
        centihertz / 100,
        centihertz % 100
    );
}

/// Announces the pin map once at boot.
#[cfg(target_os = "none")]
pub fn log_startup(pins: &BoardPins) {
    defmt::info!(
        "flicker-fusion: led={} button={} pot={} tx={}",
        pins.led,
        pins.button,
        pins.potentiometer,
        pins.serial_tx
    );
}

#[cfg(not(target_os = "none"))]
pub fn log_startup(pins: &BoardPins) {
    println!(
        "flicker-fusion: led={} button={} pot={} tx={}",
        pins.led, pins.button, pins.potentiometer, pins.serial_tx
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use flicker_core::mapper::MIN_HALF_PERIOD;
    use flicker_core::report::FrequencyReport;
    use flicker_core::time::Micros;

    #[test]
    fn drain_emits_each_record_once() {
        let mut recorder = TelemetryRecorder::<4>::new();
        let mut log = TelemetryLog::new();
        assert_eq!(log.drain(&recorder), 0);

        let report = FrequencyReport::new(MIN_HALF_PERIOD, Micros::new(10), Micros::new(30));
        recorder.record_latched(report.latched_at());
        recorder.record_report(&report, true);
        assert_eq!(log.drain(&recorder), 2);
        assert_eq!(log.drain(&recorder), 0);

        recorder.record_report(&report, false);
        assert_eq!(log.drain(&recorder), 1);
    }

    #[test]
    fn drain_skips_records_that_fell_out_of_the_ring() {
        let mut recorder = TelemetryRecorder::<2>::new();
        let mut log = TelemetryLog::new();
        for tick in 0..5 {
            recorder.record_latched(Micros::new(tick));
        }
        assert_eq!(log.drain(&recorder), 2);
    }
}
