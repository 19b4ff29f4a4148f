//! Search over the note collection.
//!
//! # Responsibility
//! - Narrow a note list by a free-text query for the home screen.
//! - Stay pure so it composes on top of any repository snapshot.

pub mod filter;
