//! Byte ranges into a text buffer.

/// Half-open byte range `[start, end)` into a UTF-8 buffer.
///
/// Used for editor selections and for parsed markdown node extents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TextSpan {
    pub start: usize,
    pub end: usize,
}

impl TextSpan {
    /// Creates a span, swapping the bounds if they arrive reversed.
    pub fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// Creates an empty span (a caret) at `pos`.
    pub fn cursor(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// Clamps both bounds into `text` and snaps them back to char boundaries.
    pub fn clamp_to(self, text: &str) -> Self {
        Self::new(
            floor_char_boundary(text, self.start),
            floor_char_boundary(text, self.end),
        )
    }

    /// Returns the slice of `text` covered by this span.
    ///
    /// The span must already be valid for `text` (see [`TextSpan::clamp_to`]).
    pub fn slice(self, text: &str) -> &str {
        &text[self.start..self.end]
    }
}

fn floor_char_boundary(text: &str, pos: usize) -> usize {
    let mut pos = pos.min(text.len());
    while !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}
