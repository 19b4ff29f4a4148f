//! Core of the Easy Notes app: a reactive note store plus the markdown
//! formatting and preview engine used by the editor.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod markdown;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{NoteOrder, RepositoryConfig};
pub use logging::{init_logging, logging_status, LogLevel, LoggingError};
pub use markdown::formatter::{apply as apply_style, FormatEffect, FormatResult};
pub use markdown::preview::derive_preview_text;
pub use markdown::token::{Marker, StyleToken};
pub use markdown::tokenizer::{parse as parse_markdown, MarkdownNode, NodeKind};
pub use model::note::{Note, NoteId, NoteInfo, UNSAVED_NOTE_ID};
pub use model::span::TextSpan;
pub use repo::note_repo::{NoteRepository, NoteSnapshot, NoteStream, RepoError, RepoResult};
pub use repo::note_store::{NoteStore, SqliteNoteStore, StoreError, StoreResult};
pub use search::filter::filter_notes;
pub use service::note_service::NoteEditor;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
