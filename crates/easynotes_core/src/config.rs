//! Repository configuration.
//!
//! # Responsibility
//! - Describe how the live note list is ordered.
//!
//! # Invariants
//! - `RepositoryConfig::default()` orders by `updated_time` descending.
//! - Every ordering is total: ties break on `id`.

use crate::model::note::Note;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sort order of the live note list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteOrder {
    #[default]
    UpdatedDesc,
    UpdatedAsc,
    CreatedDesc,
    CreatedAsc,
    /// Case-insensitive by name.
    NameAsc,
}

impl NoteOrder {
    /// Compares two notes under this order.
    ///
    /// Descending orders break ties by higher id first, ascending by lower id.
    pub fn compare(self, left: &Note, right: &Note) -> Ordering {
        match self {
            Self::UpdatedDesc => right
                .updated_time
                .cmp(&left.updated_time)
                .then_with(|| right.id.cmp(&left.id)),
            Self::UpdatedAsc => left
                .updated_time
                .cmp(&right.updated_time)
                .then_with(|| left.id.cmp(&right.id)),
            Self::CreatedDesc => right
                .created_time
                .cmp(&left.created_time)
                .then_with(|| right.id.cmp(&left.id)),
            Self::CreatedAsc => left
                .created_time
                .cmp(&right.created_time)
                .then_with(|| left.id.cmp(&right.id)),
            Self::NameAsc => left
                .name
                .to_lowercase()
                .cmp(&right.name.to_lowercase())
                .then_with(|| left.id.cmp(&right.id)),
        }
    }

    /// Sorts `notes` in place under this order.
    pub fn sort(self, notes: &mut [Note]) {
        notes.sort_by(|left, right| self.compare(left, right));
    }
}

/// Configuration for [`crate::NoteRepository`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Ordering of every stream emission.
    pub order: NoteOrder,
}
