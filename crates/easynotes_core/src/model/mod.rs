//! Domain model for notes and text ranges.
//!
//! # Responsibility
//! - Define the canonical note record persisted by the repository.
//! - Define byte ranges shared by the markdown formatter and tokenizer.
//!
//! # Invariants
//! - A persisted note always has a positive `NoteId`; `0` marks a draft.
//! - A `TextSpan` handed out by core never exceeds its buffer length.

pub mod note;
pub mod span;
