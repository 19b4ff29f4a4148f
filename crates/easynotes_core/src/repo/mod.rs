//! Note persistence and the reactive repository on top of it.
//!
//! # Responsibility
//! - Define the durable table contract (`note_store`).
//! - Own the live note collection and its subscribers (`note_repo`).
//!
//! # Invariants
//! - All note mutations funnel through `NoteRepository`.
//! - Store failures surface as `RepoError::Persistence`; lookups of missing
//!   notes are `None`, not errors.

pub mod note_repo;
pub mod note_store;
