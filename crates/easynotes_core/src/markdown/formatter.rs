//! Toolbar-driven markdown formatting.
//!
//! # Responsibility
//! - Compute the buffer mutation for one toolbar style action.
//! - Keep the returned selection valid for the returned buffer.
//!
//! # Invariants
//! - Inline tokens toggle: a selection exactly wrapped by the token's markers
//!   is unwrapped, anything else is wrapped and the selection widened so a
//!   second call removes exactly what the first inserted.
//! - Italic counts a selection as wrapped only when the star run at each end
//!   is 1 or at least 3, so bold text gains an italic layer instead of losing
//!   its bold.
//! - Block tokens replace an existing line prefix instead of stacking, and
//!   toggle off when every touched line already carries the same prefix.
//! - Block tokens never touch fenced code and ignore an empty selection;
//!   such calls report `NoEffect`.

use super::block::{classify_line, code_fence_mask, split_lines, LineKind, LineRange};
use super::token::{Marker, StyleToken};
use crate::model::span::TextSpan;

/// What a call to [`apply`] did to the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatEffect {
    /// Markers were added.
    Inserted,
    /// Markers were removed (toggle-off).
    Removed,
    /// Existing block prefixes were swapped for the requested one.
    Replaced,
    /// Buffer returned unchanged.
    NoEffect,
}

/// Buffer and selection after a formatting action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatResult {
    pub buffer: String,
    pub selection: TextSpan,
    pub effect: FormatEffect,
}

impl FormatResult {
    fn unchanged(buffer: &str, selection: TextSpan) -> Self {
        Self {
            buffer: buffer.to_string(),
            selection,
            effect: FormatEffect::NoEffect,
        }
    }

    pub fn changed(&self) -> bool {
        self.effect != FormatEffect::NoEffect
    }
}

/// Applies or removes `token` on `selection` within `buffer`.
///
/// Out-of-range selections are clamped first. Never fails.
pub fn apply(buffer: &str, selection: TextSpan, token: StyleToken) -> FormatResult {
    let selection = selection.clamp_to(buffer);
    match token.marker() {
        Marker::Wrap { open, close } => toggle_wrap(buffer, selection, token, open, close),
        Marker::LinePrefix(_) => toggle_line_prefix(buffer, selection, token),
    }
}

fn toggle_wrap(
    buffer: &str,
    selection: TextSpan,
    token: StyleToken,
    open: &str,
    close: &str,
) -> FormatResult {
    let TextSpan { start, end } = selection;

    if is_wrapped(selection.slice(buffer), token, open, close) {
        let mut next = String::with_capacity(buffer.len());
        next.push_str(&buffer[..start]);
        next.push_str(&buffer[start + open.len()..end - close.len()]);
        next.push_str(&buffer[end..]);
        return FormatResult {
            buffer: next,
            selection: TextSpan::new(start, end - open.len() - close.len()),
            effect: FormatEffect::Removed,
        };
    }

    let mut next = String::with_capacity(buffer.len() + open.len() + close.len());
    next.push_str(&buffer[..start]);
    next.push_str(open);
    next.push_str(&buffer[start..end]);
    next.push_str(close);
    next.push_str(&buffer[end..]);

    let selection = if selection.is_empty() {
        TextSpan::cursor(start + open.len())
    } else {
        TextSpan::new(start, end + open.len() + close.len())
    };
    FormatResult {
        buffer: next,
        selection,
        effect: FormatEffect::Inserted,
    }
}

fn is_wrapped(selected: &str, token: StyleToken, open: &str, close: &str) -> bool {
    let framed = selected.len() >= open.len() + close.len()
        && selected.starts_with(open)
        && selected.ends_with(close);
    if !framed || token != StyleToken::Italic {
        return framed;
    }
    // `**x**` is bold, not italic; `*x*` and `***x***` carry an italic layer.
    let leading = selected.bytes().take_while(|b| *b == b'*').count();
    let trailing = selected.bytes().rev().take_while(|b| *b == b'*').count();
    leading != 2 && trailing != 2
}

fn toggle_line_prefix(buffer: &str, selection: TextSpan, token: StyleToken) -> FormatResult {
    if selection.is_empty() {
        return FormatResult::unchanged(buffer, selection);
    }

    let lines = split_lines(buffer);
    let (first, last) = touched_lines(&lines, selection);

    let mask = code_fence_mask(buffer, &lines);
    if mask[first..=last].iter().any(|inside| *inside) {
        return FormatResult::unchanged(buffer, selection);
    }

    let touched = &lines[first..=last];
    let kinds: Vec<Option<LineKind>> = touched
        .iter()
        .map(|line| {
            let text = line.text(buffer);
            (!text.trim().is_empty()).then(|| classify_line(text))
        })
        .collect();

    if kinds.iter().all(Option::is_none) {
        return FormatResult::unchanged(buffer, selection);
    }

    let toggle_off = kinds.iter().flatten().all(|kind| matches_token(*kind, token));
    let replaced = !toggle_off
        && kinds
            .iter()
            .flatten()
            .any(|kind| kind.prefix_len() > 0);

    // Per touched line: old prefix length, new prefix text.
    let mut edits: Vec<(usize, String)> = Vec::with_capacity(touched.len());
    let mut number = 0usize;
    for kind in &kinds {
        match kind {
            None => edits.push((0, String::new())),
            Some(kind) => {
                let prefix = if toggle_off {
                    String::new()
                } else {
                    number += 1;
                    line_prefix(token, number)
                };
                edits.push((kind.prefix_len(), prefix));
            }
        }
    }

    let region_start = touched[0].start;
    let region_end = touched[touched.len() - 1].end;
    let mut next = String::with_capacity(buffer.len() + touched.len() * 4);
    next.push_str(&buffer[..region_start]);
    let mut new_starts = Vec::with_capacity(touched.len());
    let mut cursor = region_start;
    for (line, (old_len, prefix)) in touched.iter().zip(&edits) {
        next.push_str(&buffer[cursor..line.start]);
        new_starts.push(next.len());
        next.push_str(prefix);
        next.push_str(&buffer[line.start + old_len..line.end]);
        cursor = line.end;
    }
    next.push_str(&buffer[region_end..]);

    let delta = next.len() as isize - buffer.len() as isize;
    let map = |pos: usize, keep_line_start: bool| -> usize {
        // A bound between `\r` and `\n` belongs to the end of its line.
        let pos = lines
            .windows(2)
            .find(|pair| pos > pair[0].end && pos < pair[1].start)
            .map_or(pos, |pair| pair[0].end);
        for (idx, line) in touched.iter().enumerate() {
            if pos < line.start || pos > line.end {
                continue;
            }
            let (old_len, prefix) = &edits[idx];
            let offset = pos - line.start;
            let new_offset = if offset == 0 && keep_line_start {
                0
            } else if offset >= *old_len {
                prefix.len() + offset - old_len
            } else {
                prefix.len()
            };
            return new_starts[idx] + new_offset;
        }
        if pos > region_end {
            (pos as isize + delta) as usize
        } else {
            pos
        }
    };

    let next_selection = TextSpan::new(map(selection.start, true), map(selection.end, false));

    let effect = if toggle_off {
        FormatEffect::Removed
    } else if replaced {
        FormatEffect::Replaced
    } else {
        FormatEffect::Inserted
    };

    FormatResult {
        selection: next_selection.clamp_to(&next),
        buffer: next,
        effect,
    }
}

/// Returns the inclusive line index range touched by `selection`.
///
/// A non-empty selection ending exactly at a line start does not touch that line.
fn touched_lines(lines: &[LineRange], selection: TextSpan) -> (usize, usize) {
    let line_of = |pos: usize| {
        lines
            .iter()
            .rposition(|line| line.start <= pos)
            .unwrap_or(0)
    };
    let first = line_of(selection.start);
    let mut last = line_of(selection.end);
    if !selection.is_empty() && last > first && lines[last].start == selection.end {
        last -= 1;
    }
    (first, last)
}

fn matches_token(kind: LineKind, token: StyleToken) -> bool {
    match (kind, token) {
        (LineKind::Heading { level: 1, .. }, StyleToken::Heading1)
        | (LineKind::Heading { level: 2, .. }, StyleToken::Heading2)
        | (LineKind::Heading { level: 3, .. }, StyleToken::Heading3)
        | (LineKind::Bullet { .. }, StyleToken::BulletList)
        | (LineKind::Ordered { .. }, StyleToken::NumberedList) => true,
        _ => false,
    }
}

fn line_prefix(token: StyleToken, number: usize) -> String {
    match (token, token.marker()) {
        (StyleToken::NumberedList, _) => format!("{number}. "),
        (_, Marker::LinePrefix(prefix)) => prefix.to_string(),
        (_, Marker::Wrap { .. }) => String::new(),
    }
}
