//! Markdown formatting and rendering engine for the note editor.
//!
//! # Responsibility
//! - Apply/remove toolbar styles on a buffer + selection (`formatter`).
//! - Parse a buffer into an ordered node forest for preview (`tokenizer`).
//! - Derive list-row preview text (`preview`).
//!
//! # Invariants
//! - Every entry point is pure and total: malformed markdown degrades to
//!   literal text instead of failing.
//! - Offsets are UTF-8 byte offsets on char boundaries.

mod block;
pub mod formatter;
pub mod preview;
pub mod token;
pub mod tokenizer;
