//! Line splitting and block-prefix classification shared by the formatter
//! and the tokenizer.

use once_cell::sync::Lazy;
use regex::Regex;

static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,3}) ").expect("valid heading regex"));
static BULLET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-*] ").expect("valid bullet regex"));
static ORDERED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+\. ").expect("valid ordered list regex"));

const FENCE: &str = "```";

/// One buffer line; `end` excludes the `\n` (and a preceding `\r`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn text(self, buffer: &str) -> &str {
        &buffer[self.start..self.end]
    }
}

/// Block-level classification of one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineKind {
    Fence,
    Heading { level: u8, prefix_len: usize },
    Bullet { prefix_len: usize },
    Ordered { prefix_len: usize },
    Plain,
}

impl LineKind {
    /// Byte length of the block marker at the start of the line.
    pub fn prefix_len(self) -> usize {
        match self {
            Self::Heading { prefix_len, .. }
            | Self::Bullet { prefix_len }
            | Self::Ordered { prefix_len } => prefix_len,
            Self::Fence | Self::Plain => 0,
        }
    }
}

/// Splits `buffer` into lines. Always yields at least one (possibly empty) line.
pub(crate) fn split_lines(buffer: &str) -> Vec<LineRange> {
    let mut lines = Vec::new();
    let mut start = 0;
    for (idx, byte) in buffer.bytes().enumerate() {
        if byte == b'\n' {
            lines.push(trimmed_line(buffer, start, idx));
            start = idx + 1;
        }
    }
    lines.push(trimmed_line(buffer, start, buffer.len()));
    lines
}

fn trimmed_line(buffer: &str, start: usize, end: usize) -> LineRange {
    let end = if end > start && buffer.as_bytes()[end - 1] == b'\r' {
        end - 1
    } else {
        end
    };
    LineRange { start, end }
}

pub(crate) fn classify_line(line: &str) -> LineKind {
    if line.trim_end().starts_with(FENCE) {
        return LineKind::Fence;
    }
    if let Some(caps) = HEADING_RE.captures(line) {
        let hashes = caps.get(1).map_or(1, |m| m.len());
        return LineKind::Heading {
            level: hashes as u8,
            prefix_len: hashes + 1,
        };
    }
    if let Some(m) = BULLET_RE.find(line) {
        return LineKind::Bullet {
            prefix_len: m.end(),
        };
    }
    if let Some(m) = ORDERED_RE.find(line) {
        return LineKind::Ordered {
            prefix_len: m.end(),
        };
    }
    LineKind::Plain
}

/// Marks every line that belongs to a fenced code block, fences included.
///
/// An unclosed fence extends to the end of the buffer.
pub(crate) fn code_fence_mask(buffer: &str, lines: &[LineRange]) -> Vec<bool> {
    let mut mask = Vec::with_capacity(lines.len());
    let mut inside = false;
    for line in lines {
        let is_fence = classify_line(line.text(buffer)) == LineKind::Fence;
        if is_fence {
            mask.push(true);
            inside = !inside;
        } else {
            mask.push(inside);
        }
    }
    mask
}
