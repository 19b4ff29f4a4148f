//! Editor session use-case.
//!
//! # Responsibility
//! - Hold the note being edited together with its description selection.
//! - Route toolbar actions through the formatter and previews through the
//!   tokenizer.
//! - Persist or delete the note through the repository.
//!
//! # Invariants
//! - Opening with id `0` or an unknown id starts a fresh draft.
//! - A draft whose name and description are both blank is never saved.
//! - The selection always stays valid for the current description.

use crate::clock::Clock;
use crate::markdown::formatter::{apply, FormatEffect};
use crate::markdown::token::StyleToken;
use crate::markdown::tokenizer::{parse, MarkdownNode};
use crate::model::note::{Note, NoteId, NoteInfo, UNSAVED_NOTE_ID};
use crate::model::span::TextSpan;
use crate::repo::note_repo::{NoteRepository, RepoResult};
use crate::repo::note_store::NoteStore;
use log::debug;

/// One open editor over a single note.
pub struct NoteEditor<'repo, S: NoteStore, C: Clock> {
    repo: &'repo NoteRepository<S, C>,
    note: Note,
    selection: TextSpan,
}

impl<'repo, S: NoteStore, C: Clock> NoteEditor<'repo, S, C> {
    /// Opens `id` for editing, or a new draft when it is `0` or gone.
    pub fn open(repo: &'repo NoteRepository<S, C>, id: NoteId) -> Self {
        let note = repo
            .get_note_by_id(id)
            .unwrap_or_else(|| Note::new("", ""));
        let selection = TextSpan::cursor(note.description.len());
        debug!(
            "event=editor_open module=service note_id={} draft={}",
            note.id,
            !note.is_persisted()
        );
        Self {
            repo,
            note,
            selection,
        }
    }

    pub fn note(&self) -> &Note {
        &self.note
    }

    pub fn selection(&self) -> TextSpan {
        self.selection
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.note.name = name.into();
    }

    /// Replaces the description as typed, with the caret/selection after the edit.
    pub fn set_description(&mut self, description: impl Into<String>, selection: TextSpan) {
        self.note.description = description.into();
        self.selection = selection.clamp_to(&self.note.description);
    }

    pub fn set_selection(&mut self, selection: TextSpan) {
        self.selection = selection.clamp_to(&self.note.description);
    }

    /// Applies a toolbar style to the description at the current selection.
    pub fn apply_style(&mut self, token: StyleToken) -> FormatEffect {
        let result = apply(&self.note.description, self.selection, token);
        if result.changed() {
            self.note.description = result.buffer;
        }
        self.selection = result.selection;
        result.effect
    }

    /// Parses the name for the preview title.
    pub fn preview_name(&self) -> Vec<MarkdownNode> {
        parse(&self.note.name)
    }

    /// Parses the description for the preview body.
    pub fn preview_description(&self) -> Vec<MarkdownNode> {
        parse(&self.note.description)
    }

    pub fn info(&self) -> NoteInfo {
        self.note.info()
    }

    /// Persists the note and adopts the stored copy.
    ///
    /// Returns `None` without writing when the note is a blank draft.
    pub fn save(&mut self) -> RepoResult<Option<Note>> {
        if !self.note.is_persisted()
            && self.note.name.trim().is_empty()
            && self.note.description.trim().is_empty()
        {
            return Ok(None);
        }
        let saved = self.repo.add_note(self.note.clone())?;
        self.note = saved.clone();
        Ok(Some(saved))
    }

    /// Deletes the note from the repository. Drafts have nothing to delete.
    pub fn delete(self) -> RepoResult<()> {
        if self.note.id == UNSAVED_NOTE_ID {
            return Ok(());
        }
        self.repo.delete_note_by_id(self.note.id)
    }
}
