use core::convert::Infallible;
use core::time::Duration;

use flicker_core::controller::FlickerController;
use flicker_core::debounce::{ButtonLatch, DebounceConfig, TriggerMode};
use flicker_core::mailbox::ActionMailbox;
use flicker_core::mapper::AdcSample;
use flicker_core::report::{FanOut, FrequencyReport, ReportSink, format_report_line};
use flicker_core::segments::{SegmentDisplay, SegmentFrame, SegmentSink};
use flicker_core::signal::{LedOutput, Level};
use flicker_core::time::{Clock, ManualClock, Micros};

#[derive(Default)]
struct Led {
    level: Level,
    toggles: usize,
}

impl LedOutput for Led {
    type Error = Infallible;

    fn set_level(&mut self, level: Level) -> Result<(), Self::Error> {
        if level != self.level {
            self.toggles += 1;
        }
        self.level = level;
        Ok(())
    }
}

#[derive(Default)]
struct Lines(Vec<String>);

impl ReportSink for Lines {
    type Error = Infallible;

    fn report(&mut self, report: &FrequencyReport) -> Result<(), Self::Error> {
        let line = format_report_line(report).expect("line fits");
        self.0.push(line.as_str().to_owned());
        Ok(())
    }
}

#[derive(Default)]
struct Panel(Option<SegmentFrame>);

impl SegmentDisplay for Panel {
    type Error = Infallible;

    fn show(&mut self, frame: SegmentFrame) -> Result<(), Self::Error> {
        self.0 = Some(frame);
        Ok(())
    }
}

fn press_and_poll(sample: AdcSample) -> (f32, String) {
    let clock = ManualClock::default();
    let mailbox = ActionMailbox::new();
    let config = DebounceConfig::DEFAULT;
    let mut latch = ButtonLatch::new(config, &mailbox);
    let mut controller =
        FlickerController::new(Led::default(), &mailbox, clock.now()).expect("led");
    let mut sink = Lines::default();

    latch.on_edge(Level::High, clock.now());
    clock.advance(Duration::from_micros(10));
    let outcome = controller
        .poll(clock.now(), sample, &mut sink)
        .expect("poll");

    let report = outcome.report.expect("press reported");
    (report.hertz(), sink.0.remove(0))
}

#[test]
fn bottom_of_travel_reports_100_hz() {
    let (hertz, line) = press_and_poll(AdcSample::MIN);
    assert!((hertz - 100.0).abs() < f32::EPSILON);
    assert_eq!(line, "Flicker fusion threshold frequency: 100.00Hz");
}

#[test]
fn top_of_travel_reports_25_hz() {
    let (hertz, line) = press_and_poll(AdcSample::MAX);
    assert!((hertz - 25.0).abs() < f32::EPSILON);
    assert_eq!(line, "Flicker fusion threshold frequency: 25.00Hz");
}

#[test]
fn busy_loop_blinks_and_reports_each_debounced_press() {
    let clock = ManualClock::starting_at(Micros::new(u32::MAX - 50_000));
    let mailbox = ActionMailbox::new();
    let config = DebounceConfig::DEFAULT.with_trigger(TriggerMode::AnyChange);
    let mut latch = ButtonLatch::new(config, &mailbox);
    let mut controller =
        FlickerController::new(Led::default(), &mailbox, clock.now()).expect("led");
    let mut sink = FanOut::new(Lines::default(), SegmentSink::new(Panel::default()));

    // Interrupt edges (offset from start in us) with contact chatter.
    let mut edges = vec![
        (10_000, Level::High),
        (10_200, Level::Low),
        (10_900, Level::High),
        (150_000, Level::Low),
        (150_300, Level::High),
        (151_000, Level::Low),
        (300_000, Level::High),
    ]
    .into_iter()
    .peekable();

    let start = clock.now();
    let step = Duration::from_micros(100);
    let mut reports = Vec::new();
    for _ in 0..4_000 {
        let now = clock.advance(step);
        let offset = now.wrapping_since(start);
        while let Some(&(at, level)) = edges.peek() {
            if offset < Duration::from_micros(at) {
                break;
            }
            latch.on_edge(level, now);
            edges.next();
        }
        let outcome = controller
            .poll(now, AdcSample::new(1023), &mut sink)
            .expect("poll");
        if let Some(report) = outcome.report {
            reports.push(report);
        }
    }

    assert_eq!(reports.len(), 2);
    // 400ms of 20ms half-periods; the first toggle needs >20ms.
    let toggles = controller.led().toggles;
    assert!((19..=20).contains(&toggles), "toggles = {toggles}");

    let (lines, panel) = sink.into_inner();
    assert_eq!(lines.0.len(), 2);
    assert_eq!(panel.last_frame(), Some(SegmentFrame::from_tenths(250)));
}
