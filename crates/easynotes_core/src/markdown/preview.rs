//! Plain-text preview for note list rows.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

const PREVIEW_MAX_CHARS: usize = 100;

/// `![alt](src)` or `[label](href)`; group 1 is the image bang.
static LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(!?)\[([^\]]*)\]\([^)]*\)").expect("valid link regex"));
/// Ordered-list numbers at line start, or any run of markdown punctuation.
static MARKUP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*[0-9]+\.[ \t]|[*_`#>~\-\[\]()!]+").expect("valid markup regex")
});

/// Derives a one-line plain-text preview from markdown source.
///
/// Images are dropped and links keep their label. List numbers and markdown
/// punctuation become spaces, whitespace runs collapse, and at most 100 chars
/// are kept. Returns `None` when nothing readable remains.
pub fn derive_preview_text(markdown: &str) -> Option<String> {
    let labelled = LINK_RE.replace_all(markdown, |caps: &Captures<'_>| {
        if caps[1].is_empty() {
            caps[2].to_string()
        } else {
            " ".to_string()
        }
    });
    let stripped = MARKUP_RE.replace_all(&labelled, " ");
    let words: Vec<&str> = stripped.split_whitespace().collect();
    if words.is_empty() {
        return None;
    }
    Some(words.join(" ").chars().take(PREVIEW_MAX_CHARS).collect())
}
