//! Guidance overlay, as a list of marks for an external painter.
use crate::geometry::{Point, Rect};
use crate::hinter::Hint;

/// Side of the square drawn around a hint's first cell.
pub const MARKER_SIZE: u32 = 32;

/// One drawing instruction, in image coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mark {
    /// Gradient line from the first to the second cell of a move.
    Line { from: Point, to: Point },
    /// Blinking outline around the first cell.
    Box(Rect),
    /// Match length written over the first cell.
    Label { at: Point, count: u32 },
}

/// Frame counter driving the marker blink: lit for frames 6..=10 of every 11.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Blink {
    frame: u8,
}

impl Blink {
    pub fn is_lit(&self) -> bool {
        self.frame > 5
    }

    /// Moves to the next frame, wrapping after 10.
    pub fn advance(&mut self) {
        self.frame = if self.frame >= 10 { 0 } else { self.frame + 1 };
    }
}

/// Marks for `hints` (normally `Hints::displayed()`) in ranked order.
///
/// Only hints scoring above `label_cutoff` get a count label.
pub fn plan(hints: &[Hint], blink: Blink, label_cutoff: u32) -> Vec<Mark> {
    let half = (MARKER_SIZE / 2) as i32;
    let mut marks = Vec::with_capacity(hints.len() * 3);
    for hint in hints {
        if blink.is_lit() {
            marks.push(Mark::Box(Rect::new(
                hint.point_from.x - half,
                hint.point_from.y - half,
                MARKER_SIZE,
                MARKER_SIZE,
            )));
        }
        marks.push(Mark::Line {
            from: hint.point_from,
            to: hint.point_to,
        });
        if hint.count > label_cutoff {
            marks.push(Mark::Label {
                at: hint.point_from,
                count: hint.count,
            });
        }
    }
    marks
}
