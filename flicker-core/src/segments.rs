//! Four-digit seven-segment rendering of a frequency report.
//!
//! Segment bits follow the usual `a..g` order (`a` = bit 0, `g` = bit 6) with
//! the decimal point on bit 7, which is what most multiplexed driver chips
//! expect. Values are shown in tenths of a hertz with the decimal point fixed
//! on the third digit, so the meter's 25.0–100.0 Hz range always fits.

use core::fmt;

use crate::report::{FrequencyReport, ReportSink};

/// Number of digits on the display.
pub const DIGITS: usize = 4;

/// Decimal point segment.
pub const SEGMENT_DP: u8 = 0b1000_0000;
/// Middle bar, used for the overflow dashes.
pub const SEGMENT_G: u8 = 0b0100_0000;

const DIGIT_GLYPHS: [u8; 10] = [
    0b0011_1111, // 0
    0b0000_0110, // 1
    0b0101_1011, // 2
    0b0100_1111, // 3
    0b0110_0110, // 4
    0b0110_1101, // 5
    0b0111_1101, // 6
    0b0000_0111, // 7
    0b0111_1111, // 8
    0b0110_1111, // 9
];

const BLANK: u8 = 0;
const DECIMAL_DIGIT: usize = 2;
const MAX_TENTHS: u32 = 9_999;

/// Segment patterns for every digit, most significant first.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct SegmentFrame([u8; DIGITS]);

impl SegmentFrame {
    /// All segments dark.
    pub const BLANK: Self = Self([BLANK; DIGITS]);
    /// Shown when the value does not fit.
    pub const OVERFLOW: Self = Self([SEGMENT_G; DIGITS]);

    /// Wraps raw segment patterns.
    #[must_use]
    pub const fn from_raw(raw: [u8; DIGITS]) -> Self {
        Self(raw)
    }

    /// Raw segment patterns.
    #[must_use]
    pub const fn raw(&self) -> [u8; DIGITS] {
        self.0
    }

    /// Encodes a value given in tenths, e.g. `250` renders as ` 25.0`.
    #[must_use]
    pub fn from_tenths(tenths: u32) -> Self {
        if tenths > MAX_TENTHS {
            return Self::OVERFLOW;
        }

        let mut digits = [0u8; DIGITS];
        let mut rest = tenths;
        for slot in digits.iter_mut().rev() {
            *slot = digit_glyph(rest % 10);
            rest /= 10;
        }

        // Blank leading zeros, but always keep the units digit.
        for slot in digits.iter_mut().take(DECIMAL_DIGIT) {
            if *slot != DIGIT_GLYPHS[0] {
                break;
            }
            *slot = BLANK;
        }

        digits[DECIMAL_DIGIT] |= SEGMENT_DP;
        Self(digits)
    }

    /// Encodes a report's frequency, rounded to the nearest tenth of a hertz.
    #[must_use]
    pub fn from_report(report: &FrequencyReport) -> Self {
        Self::from_tenths(round_tenths(report.centihertz()))
    }
}

fn round_tenths(centihertz: u32) -> u32 {
    (centihertz + 5) / 10
}

fn digit_glyph(value: u32) -> u8 {
    usize::try_from(value)
        .ok()
        .and_then(|index| DIGIT_GLYPHS.get(index))
        .copied()
        .unwrap_or(SEGMENT_G)
}

impl fmt::Display for SegmentFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for pattern in self.0 {
            let glyph = pattern & !SEGMENT_DP;
            let ch = match DIGIT_GLYPHS.iter().position(|&known| known == glyph) {
                Some(index) => char::from(b'0' + u8::try_from(index).unwrap_or(0)),
                None if glyph == BLANK => ' ',
                None if glyph == SEGMENT_G => '-',
                None => '?',
            };
            write!(f, "{ch}")?;
            if pattern & SEGMENT_DP != 0 {
                f.write_str(".")?;
            }
        }
        Ok(())
    }
}

/// Segment display driver.
pub trait SegmentDisplay {
    /// Transport-specific error type.
    type Error;

    /// Replaces the displayed frame.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the frame could not be written.
    fn show(&mut self, frame: SegmentFrame) -> Result<(), Self::Error>;
}

/// Adapts a [`SegmentDisplay`] into a [`ReportSink`].
pub struct SegmentSink<D> {
    display: D,
    last: Option<SegmentFrame>,
}

impl<D> SegmentSink<D> {
    /// Wraps a display driver.
    pub const fn new(display: D) -> Self {
        Self {
            display,
            last: None,
        }
    }

    /// Frame most recently sent to the display.
    pub const fn last_frame(&self) -> Option<SegmentFrame> {
        self.last
    }

    /// Borrow of the display driver.
    pub fn display(&self) -> &D {
        &self.display
    }
}

impl<D: SegmentDisplay> ReportSink for SegmentSink<D> {
    type Error = D::Error;

    fn report(&mut self, report: &FrequencyReport) -> Result<(), Self::Error> {
        let frame = SegmentFrame::from_report(report);
        self.display.show(frame)?;
        self.last = Some(frame);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::{HalfPeriod, MAX_HALF_PERIOD, MIN_HALF_PERIOD};
    use crate::time::Micros;

    fn report(half_period: HalfPeriod) -> FrequencyReport {
        FrequencyReport::new(half_period, Micros::ZERO, Micros::ZERO)
    }

    #[test]
    fn renders_range_endpoints() {
        let low = SegmentFrame::from_report(&report(MAX_HALF_PERIOD));
        assert_eq!(low.raw(), [BLANK, 0b0101_1011, 0b1110_1101, 0b0011_1111]);

        let high = SegmentFrame::from_report(&report(MIN_HALF_PERIOD));
        assert_eq!(high.raw(), [0b0000_0110, 0b0011_1111, 0b1011_1111, 0b0011_1111]);
    }

    #[test]
    fn rounds_to_nearest_tenth() {
        // 500000 / 7500 = 66.666...
        let frame = SegmentFrame::from_report(&report(HalfPeriod::clamped(7_500)));
        let mut text = heapless::String::<8>::new();
        core::fmt::write(&mut text, format_args!("{frame}")).unwrap();
        assert_eq!(text.as_str(), " 66.7");
    }

    #[test]
    fn small_values_keep_units_digit() {
        assert_eq!(SegmentFrame::from_tenths(5).raw()[..DECIMAL_DIGIT], [BLANK, BLANK]);
        assert_eq!(SegmentFrame::from_tenths(5).raw()[DECIMAL_DIGIT], DIGIT_GLYPHS[0] | SEGMENT_DP);
    }

    #[test]
    fn oversized_values_show_dashes() {
        assert_eq!(SegmentFrame::from_tenths(10_000), SegmentFrame::OVERFLOW);
    }

    #[test]
    fn sink_remembers_last_frame() {
        struct Recorder(usize);

        impl SegmentDisplay for Recorder {
            type Error = ();

            fn show(&mut self, _: SegmentFrame) -> Result<(), Self::Error> {
                self.0 += 1;
                Ok(())
            }
        }

        let mut sink = SegmentSink::new(Recorder(0));
        sink.report(&report(MIN_HALF_PERIOD)).unwrap();
        assert_eq!(sink.display().0, 1);
        assert_eq!(sink.last_frame(), Some(SegmentFrame::from_tenths(1_000)));
    }
}
