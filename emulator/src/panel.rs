//! ASCII rendering of the four-digit segment display.

use std::convert::Infallible;

use flicker_core::segments::{DIGITS, SEGMENT_DP, SegmentDisplay, SegmentFrame};

const SEG_A: u8 = 1 << 0;
const SEG_B: u8 = 1 << 1;
const SEG_C: u8 = 1 << 2;
const SEG_D: u8 = 1 << 3;
const SEG_E: u8 = 1 << 4;
const SEG_F: u8 = 1 << 5;
const SEG_G: u8 = 1 << 6;

/// Host stand-in for the segment display; keeps the shown frame.
#[derive(Debug, Default)]
pub struct AsciiPanel {
    frame: SegmentFrame,
    updates: u32,
}

impl AsciiPanel {
    pub fn frame(&self) -> SegmentFrame {
        self.frame
    }

    pub fn updates(&self) -> u32 {
        self.updates
    }

    /// Three text rows drawing the current frame.
    pub fn render(&self) -> [String; 3] {
        render_frame(self.frame)
    }
}

impl SegmentDisplay for AsciiPanel {
    type Error = Infallible;

    fn show(&mut self, frame: SegmentFrame) -> Result<(), Self::Error> {
        self.frame = frame;
        self.updates += 1;
        Ok(())
    }
}

fn lit(pattern: u8, segment: u8, on: char) -> char {
    if pattern & segment == 0 { ' ' } else { on }
}

/// Draws each digit in a 3x3 cell followed by a decimal-point column.
#[must_use]
pub fn render_frame(frame: SegmentFrame) -> [String; 3] {
    let mut rows: [String; 3] = Default::default();
    for pattern in frame.raw() {
        rows[0].extend([' ', lit(pattern, SEG_A, '_'), ' ', ' ']);
        rows[1].extend([
            lit(pattern, SEG_F, '|'),
            lit(pattern, SEG_G, '_'),
            lit(pattern, SEG_B, '|'),
            ' ',
        ]);
        rows[2].extend([
            lit(pattern, SEG_E, '|'),
            lit(pattern, SEG_D, '_'),
            lit(pattern, SEG_C, '|'),
            lit(pattern, SEGMENT_DP, '.'),
        ]);
    }
    debug_assert!(rows.iter().all(|row| row.len() == DIGITS * 4));
    rows
}
