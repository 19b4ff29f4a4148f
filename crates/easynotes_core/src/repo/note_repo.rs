//! Reactive note repository.
//!
//! # Responsibility
//! - Own the authoritative, ordered note snapshot.
//! - Funnel every mutation through one durable store and publish the result
//!   to live subscribers.
//!
//! # Invariants
//! - Writes are serialized: one mutation in flight, later callers queue on
//!   the store lock and apply in arrival order (last write wins).
//! - The snapshot advances only after the store confirmed the write; a failed
//!   write is reported and leaves subscribers untouched.
//! - `created_time` is kept across saves; `updated_time` strictly increases.
//! - A subscriber registered after a write returns sees that write first.
//!
//! # Threading
//! Mutations block on SQLite I/O. Callers dispatch them off the thread that
//! drives stream subscribers.

use crate::clock::{Clock, SystemClock};
use crate::config::RepositoryConfig;
use crate::model::note::{Note, NoteId, UNSAVED_NOTE_ID};
use crate::repo::note_store::{NoteStore, SqliteNoteStore, StoreError};
use crate::search::filter::filter_notes;
use log::{error, info};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::sync::watch;

pub type RepoResult<T> = Result<T, RepoError>;

/// Shared, immutable note list published to subscribers.
pub type NoteSnapshot = Arc<Vec<Note>>;

/// Repository error for note mutations.
#[derive(Debug)]
pub enum RepoError {
    /// Store unavailable or write rejected. Nothing was published.
    Persistence(StoreError),
    /// Store handed back a note that violates model invariants.
    InvalidNote(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Persistence(err) => write!(f, "note persistence failed: {err}"),
            Self::InvalidNote(message) => write!(f, "invalid note: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence(err) => Some(err),
            Self::InvalidNote(_) => None,
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Persistence(value)
    }
}

/// Live view of the repository's ordered note list.
///
/// Holds the latest snapshot on creation. Dropping the stream detaches it.
pub struct NoteStream {
    rx: watch::Receiver<NoteSnapshot>,
}

impl NoteStream {
    /// Returns the latest published snapshot and marks it as seen.
    pub fn current(&mut self) -> NoteSnapshot {
        self.rx.borrow_and_update().clone()
    }

    /// Returns whether a snapshot newer than the last seen one is available.
    ///
    /// Returns `false` once the repository is gone.
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Waits for the next emission and returns it.
    ///
    /// Returns `None` once the repository has been dropped.
    pub async fn changed(&mut self) -> Option<NoteSnapshot> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Returns the latest snapshot narrowed by a search query.
    pub fn filtered(&mut self, query: &str) -> Vec<Note> {
        filter_notes(&self.current(), query)
    }
}

/// Reactive store over the note collection.
pub struct NoteRepository<S: NoteStore, C: Clock = SystemClock> {
    store: Mutex<S>,
    clock: C,
    config: RepositoryConfig,
    snapshot: watch::Sender<NoteSnapshot>,
}

impl NoteRepository<SqliteNoteStore, SystemClock> {
    /// Opens a file-backed repository with the wall clock.
    pub fn open(path: impl AsRef<Path>, config: RepositoryConfig) -> RepoResult<Self> {
        Self::new(SqliteNoteStore::open(path)?, SystemClock, config)
    }
}

impl<S: NoteStore, C: Clock> NoteRepository<S, C> {
    /// Builds a repository and loads the initial snapshot from `store`.
    pub fn new(store: S, clock: C, config: RepositoryConfig) -> RepoResult<Self> {
        let mut notes = store.query_all()?;
        config.order.sort(&mut notes);
        info!(
            "event=repo_init module=repo status=ok notes={} order={:?}",
            notes.len(),
            config.order
        );
        let (snapshot, _) = watch::channel(Arc::new(notes));
        Ok(Self {
            store: Mutex::new(store),
            clock,
            config,
            snapshot,
        })
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Subscribes to the live, ordered note list.
    pub fn get_all_notes(&self) -> NoteStream {
        NoteStream {
            rx: self.snapshot.subscribe(),
        }
    }

    /// Number of live [`NoteStream`]s.
    pub fn subscriber_count(&self) -> usize {
        self.snapshot.receiver_count()
    }

    /// Looks up one note in the latest snapshot.
    ///
    /// Drafts (id `0`) and deleted notes are `None`.
    pub fn get_note_by_id(&self, id: NoteId) -> Option<Note> {
        if id == UNSAVED_NOTE_ID {
            return None;
        }
        self.snapshot
            .borrow()
            .iter()
            .find(|note| note.id == id)
            .cloned()
    }

    /// Returns the most recently updated note, whatever the configured order.
    pub fn latest_note(&self) -> Option<Note> {
        self.snapshot
            .borrow()
            .iter()
            .max_by(|left, right| {
                left.updated_time
                    .cmp(&right.updated_time)
                    .then_with(|| left.id.cmp(&right.id))
            })
            .cloned()
    }

    /// Saves `note`, assigning an id when it is a draft.
    ///
    /// A non-zero id that is not stored is inserted under that id.
    ///
    /// # Errors
    /// - `Persistence` when the store rejects the write; subscribers see no change.
    pub fn add_note(&self, note: Note) -> RepoResult<Note> {
        let started_at = Instant::now();
        let mut store = self.lock_store();
        let now = self.clock.now_millis();

        let result = upsert(&mut *store, note, now);
        let saved = match result {
            Ok(saved) => saved,
            Err(err) => {
                error!(
                    "event=note_upsert module=repo status=error duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                return Err(err);
            }
        };

        let order = self.config.order;
        self.snapshot.send_modify(|notes| {
            let notes = Arc::make_mut(notes);
            match notes.iter_mut().find(|existing| existing.id == saved.id) {
                Some(existing) => *existing = saved.clone(),
                None => notes.push(saved.clone()),
            }
            order.sort(notes);
        });
        drop(store);

        info!(
            "event=note_upsert module=repo status=ok note_id={} duration_ms={}",
            saved.id,
            started_at.elapsed().as_millis()
        );
        Ok(saved)
    }

    /// Deletes one note. Deleting an unknown id is a no-op.
    pub fn delete_note_by_id(&self, id: NoteId) -> RepoResult<()> {
        self.delete_notes([id]).map(|_| ())
    }

    /// Deletes every listed note in one durable step and one emission.
    ///
    /// Returns how many notes existed. Unknown ids are ignored.
    pub fn delete_notes(&self, ids: impl IntoIterator<Item = NoteId>) -> RepoResult<usize> {
        let ids: BTreeSet<NoteId> = ids
            .into_iter()
            .filter(|id| *id != UNSAVED_NOTE_ID)
            .collect();
        if ids.is_empty() {
            return Ok(0);
        }

        let started_at = Instant::now();
        let mut store = self.lock_store();
        let targets: Vec<NoteId> = ids.iter().copied().collect();
        let removed = match store.delete_many(&targets) {
            Ok(removed) => removed,
            Err(err) => {
                error!(
                    "event=note_delete module=repo status=error requested={} duration_ms={} error={err}",
                    targets.len(),
                    started_at.elapsed().as_millis()
                );
                return Err(err.into());
            }
        };

        if removed > 0 {
            self.snapshot.send_modify(|notes| {
                Arc::make_mut(notes).retain(|note| !ids.contains(&note.id));
            });
        }
        drop(store);

        info!(
            "event=note_delete module=repo status=ok requested={} removed={removed} duration_ms={}",
            targets.len(),
            started_at.elapsed().as_millis()
        );
        Ok(removed)
    }

    fn lock_store(&self) -> MutexGuard<'_, S> {
        // A panicked writer never published, so the snapshot is still
        // consistent with the store's last committed state.
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn upsert<S: NoteStore + ?Sized>(store: &mut S, mut note: Note, now: i64) -> RepoResult<Note> {
    if note.id != UNSAVED_NOTE_ID {
        if let Some(existing) = store.get(note.id)? {
            note.created_time = existing.created_time;
            note.updated_time = now.max(existing.updated_time + 1);
            if !store.update(&note)? {
                return Err(RepoError::InvalidNote(format!(
                    "note {} vanished during update",
                    note.id
                )));
            }
            return Ok(note);
        }
    }

    note.created_time = now;
    note.updated_time = now;
    let id = store.insert(&note)?;
    if id <= UNSAVED_NOTE_ID {
        return Err(RepoError::InvalidNote(format!(
            "store assigned non-positive id {id}"
        )));
    }
    note.id = id;
    Ok(note)
}
