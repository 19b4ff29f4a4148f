//! Note domain model.
//!
//! # Responsibility
//! - Define the note record shared by repository, search and UI callers.
//! - Provide draft/persisted helpers and info-sheet statistics.
//!
//! # Invariants
//! - `id == 0` is a transient draft and never collides with a stored id.
//! - `created_time` is fixed at first persist.
//! - `updated_time` only moves forward across saves.

use serde::{Deserialize, Serialize};

/// Integer primary key of a note. `0` means "not yet persisted".
pub type NoteId = i64;

/// Id carried by a draft note that has never been saved.
pub const UNSAVED_NOTE_ID: NoteId = 0;

/// Canonical note record.
///
/// Field names match the `notes` table columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Primary key, or [`UNSAVED_NOTE_ID`] for drafts.
    pub id: NoteId,
    /// Title line. May be empty.
    pub name: String,
    /// Markdown body. May be empty.
    pub description: String,
    /// Unix epoch milliseconds of first persist.
    pub created_time: i64,
    /// Unix epoch milliseconds of the latest persist.
    pub updated_time: i64,
}

/// Statistics shown on the note information sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteInfo {
    pub created_time: i64,
    pub words: usize,
    pub characters: usize,
}

impl Note {
    /// Creates a draft note that the repository will assign an id on save.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: UNSAVED_NOTE_ID,
            name: name.into(),
            description: description.into(),
            created_time: 0,
            updated_time: 0,
        }
    }

    /// Returns whether this note has been assigned a stored id.
    pub fn is_persisted(&self) -> bool {
        self.id != UNSAVED_NOTE_ID
    }

    /// Computes word/character statistics over the description.
    ///
    /// Words are whitespace-separated runs; characters are Unicode scalar values.
    pub fn info(&self) -> NoteInfo {
        NoteInfo {
            created_time: self.created_time,
            words: self.description.split_whitespace().count(),
            characters: self.description.chars().count(),
        }
    }
}
