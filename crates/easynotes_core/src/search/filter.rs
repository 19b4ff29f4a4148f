//! Text query filter for the note list.
//!
//! # Invariants
//! - Blank queries return the input unchanged.
//! - Matching is case-insensitive and never reorders notes.

use crate::model::note::Note;

/// Keeps notes whose `name` followed by `description` contains `query`,
/// ignoring case.
///
/// Recomputes from scratch on every call; note sets are small.
pub fn filter_notes(notes: &[Note], query: &str) -> Vec<Note> {
    if query.trim().is_empty() {
        return notes.to_vec();
    }
    let needle = query.to_lowercase();
    notes
        .iter()
        .filter(|note| searchable_text(note).contains(&needle))
        .cloned()
        .collect()
}

fn searchable_text(note: &Note) -> String {
    let mut text = String::with_capacity(note.name.len() + note.description.len());
    text.push_str(&note.name.to_lowercase());
    text.push_str(&note.description.to_lowercase());
    text
}
