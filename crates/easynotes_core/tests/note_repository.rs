use easynotes_core::{
    filter_notes, ManualClock, Note, NoteId, NoteOrder, NoteRepository, NoteStore,
    RepoError, RepositoryConfig, SqliteNoteStore, StoreError, StoreResult,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn memory_repo(start: i64) -> NoteRepository<SqliteNoteStore, ManualClock> {
    NoteRepository::new(
        SqliteNoteStore::open_in_memory().unwrap(),
        ManualClock::new(start),
        RepositoryConfig::default(),
    )
    .unwrap()
}

fn ids(notes: &[Note]) -> Vec<NoteId> {
    notes.iter().map(|note| note.id).collect()
}

/// Store that rejects every call while `offline` is set.
struct FlakyStore {
    inner: SqliteNoteStore,
    offline: Arc<AtomicBool>,
}

impl FlakyStore {
    fn check(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("disk detached".to_string()));
        }
        Ok(())
    }
}

impl NoteStore for FlakyStore {
    fn insert(&mut self, note: &Note) -> StoreResult<NoteId> {
        self.check()?;
        self.inner.insert(note)
    }

    fn update(&mut self, note: &Note) -> StoreResult<bool> {
        self.check()?;
        self.inner.update(note)
    }

    fn delete(&mut self, id: NoteId) -> StoreResult<bool> {
        self.check()?;
        self.inner.delete(id)
    }

    fn delete_many(&mut self, ids: &[NoteId]) -> StoreResult<usize> {
        self.check()?;
        self.inner.delete_many(ids)
    }

    fn get(&self, id: NoteId) -> StoreResult<Option<Note>> {
        self.check()?;
        self.inner.get(id)
    }

    fn query_all(&self) -> StoreResult<Vec<Note>> {
        self.check()?;
        self.inner.query_all()
    }
}

#[test]
fn add_draft_assigns_id_and_equal_timestamps() {
    let repo = memory_repo(5_000);
    let saved = repo.add_note(Note::new("Groceries", "- milk")).unwrap();

    assert!(saved.id > 0);
    let loaded = repo.get_note_by_id(saved.id).unwrap();
    assert_eq!(loaded.created_time, 5_000);
    assert_eq!(loaded.updated_time, loaded.created_time);
    assert_eq!(loaded.description, "- milk");
}

#[test]
fn resave_preserves_created_time_and_advances_updated_time() {
    let clock_start = 5_000;
    let repo = memory_repo(clock_start);
    let mut note = repo.add_note(Note::new("a", "")).unwrap();

    note.description = "changed".to_string();
    note.created_time = 1; // callers cannot rewrite history
    let resaved = repo.add_note(note).unwrap();

    assert_eq!(resaved.created_time, clock_start);
    assert!(resaved.updated_time > clock_start);
    assert_eq!(
        repo.get_note_by_id(resaved.id).unwrap().description,
        "changed"
    );
}

#[test]
fn unknown_nonzero_id_is_inserted_under_that_id() {
    let repo = memory_repo(10);
    let mut note = Note::new("imported", "");
    note.id = 42;
    let saved = repo.add_note(note).unwrap();
    assert_eq!(saved.id, 42);
    assert_eq!(saved.created_time, 10);

    let next = repo.add_note(Note::new("fresh", "")).unwrap();
    assert!(next.id > 42);
}

#[test]
fn list_is_ordered_by_updated_time_desc_and_filterable() {
    let repo = memory_repo(100);

    let first = repo.add_note(Note::new("Alpha plan", "")).unwrap();
    repo.clock().set(200);
    let second = repo.add_note(Note::new("beta", "")).unwrap();

    let mut stream = repo.get_all_notes();
    let notes = stream.current();
    assert_eq!(ids(&notes), vec![second.id, first.id]);
    assert_eq!(ids(&filter_notes(&notes, "")), vec![second.id, first.id]);
    assert_eq!(ids(&stream.filtered("ALPHA")), vec![first.id]);
}

#[test]
fn late_subscriber_sees_completed_write_first() {
    let repo = memory_repo(1);
    let saved = repo.add_note(Note::new("written before subscribe", "")).unwrap();

    let mut stream = repo.get_all_notes();
    assert!(!stream.has_changed());
    assert_eq!(ids(&stream.current()), vec![saved.id]);
}

#[test]
fn existing_subscriber_is_notified_of_add_and_delete() {
    let repo = memory_repo(1);
    let mut stream = repo.get_all_notes();
    assert!(stream.current().is_empty());

    let saved = repo.add_note(Note::new("n", "")).unwrap();
    assert!(stream.has_changed());
    assert_eq!(ids(&stream.current()), vec![saved.id]);
    assert!(!stream.has_changed());

    repo.delete_note_by_id(saved.id).unwrap();
    assert!(stream.has_changed());
    assert!(stream.current().is_empty());
    assert_eq!(repo.get_note_by_id(saved.id), None);
}

#[test]
fn deleting_absent_id_is_silent_no_op() {
    let repo = memory_repo(1);
    let kept = repo.add_note(Note::new("kept", "")).unwrap();
    let mut stream = repo.get_all_notes();
    let before = stream.current();

    repo.delete_note_by_id(9_999).unwrap();
    repo.delete_note_by_id(0).unwrap();

    assert!(!stream.has_changed());
    assert_eq!(stream.current(), before);
    assert_eq!(ids(&before), vec![kept.id]);
}

#[test]
fn bulk_delete_removes_selected_notes_in_one_emission() {
    let repo = memory_repo(1);
    let a = repo.add_note(Note::new("a", "")).unwrap();
    let b = repo.add_note(Note::new("b", "")).unwrap();
    let c = repo.add_note(Note::new("c", "")).unwrap();
    let mut stream = repo.get_all_notes();

    let selected: HashSet<NoteId> = [a.id, c.id, 777].into_iter().collect();
    let removed = repo.delete_notes(selected).unwrap();

    assert_eq!(removed, 2);
    assert!(stream.has_changed());
    assert_eq!(ids(&stream.current()), vec![b.id]);
}

#[test]
fn dropped_stream_detaches_immediately() {
    let repo = memory_repo(1);
    let first = repo.get_all_notes();
    let second = repo.get_all_notes();
    assert_eq!(repo.subscriber_count(), 2);

    drop(first);
    assert_eq!(repo.subscriber_count(), 1);
    drop(second);
    assert_eq!(repo.subscriber_count(), 0);

    // Writes with nobody listening still land.
    let saved = repo.add_note(Note::new("quiet", "")).unwrap();
    assert!(repo.get_note_by_id(saved.id).is_some());
}

#[test]
fn persistence_failure_is_reported_and_not_published() {
    let offline = Arc::new(AtomicBool::new(false));
    let store = FlakyStore {
        inner: SqliteNoteStore::open_in_memory().unwrap(),
        offline: Arc::clone(&offline),
    };
    let repo = NoteRepository::new(store, ManualClock::new(1), RepositoryConfig::default())
        .unwrap();
    let saved = repo.add_note(Note::new("durable", "")).unwrap();
    let mut stream = repo.get_all_notes();
    let before = stream.current();

    offline.store(true, Ordering::SeqCst);
    let mut edited = saved.clone();
    edited.name = "unsaved edit".to_string();
    let err = repo.add_note(edited).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Persistence(StoreError::Unavailable(_))
    ));
    let err = repo.delete_note_by_id(saved.id).unwrap_err();
    assert!(matches!(err, RepoError::Persistence(_)));

    assert!(!stream.has_changed());
    assert_eq!(stream.current(), before);
    assert_eq!(repo.get_note_by_id(saved.id).unwrap().name, "durable");
}

#[test]
fn concurrent_drafts_all_get_distinct_ids() {
    let repo = Arc::new(memory_repo(1));
    let workers: Vec<_> = (0..8)
        .map(|worker| {
            let repo = Arc::clone(&repo);
            thread::spawn(move || {
                (0..10)
                    .map(|idx| {
                        repo.add_note(Note::new(format!("w{worker}-{idx}"), ""))
                            .unwrap()
                            .id
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut all_ids = HashSet::new();
    for worker in workers {
        for id in worker.join().unwrap() {
            assert!(all_ids.insert(id), "duplicate id {id}");
        }
    }
    assert_eq!(all_ids.len(), 80);
    assert_eq!(repo.get_all_notes().current().len(), 80);
}

#[test]
fn concurrent_saves_of_same_note_never_interleave() {
    let repo = Arc::new(memory_repo(1));
    let base = repo.add_note(Note::new("shared", "")).unwrap();

    let workers: Vec<_> = (0..4)
        .map(|worker| {
            let repo = Arc::clone(&repo);
            let base = base.clone();
            thread::spawn(move || {
                for idx in 0..25 {
                    let mut note = base.clone();
                    note.name = format!("name-{worker}-{idx}");
                    note.description = format!("body-{worker}-{idx}");
                    repo.add_note(note).unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let stored = repo.get_note_by_id(base.id).unwrap();
    let name_suffix = stored.name.trim_start_matches("name-");
    let body_suffix = stored.description.trim_start_matches("body-");
    assert_eq!(name_suffix, body_suffix);
    assert_eq!(stored.created_time, base.created_time);
    // 100 saves, each strictly after the previous one.
    assert_eq!(stored.updated_time, base.updated_time + 100);
    assert_eq!(repo.get_all_notes().current().len(), 1);
}

#[test]
fn file_backed_repository_reloads_on_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.db");

    let saved = {
        let repo = NoteRepository::open(&path, RepositoryConfig::default()).unwrap();
        repo.add_note(Note::new("persisted", "**body**")).unwrap()
    };

    let config = RepositoryConfig {
        order: NoteOrder::NameAsc,
    };
    let reopened = NoteRepository::open(&path, config).unwrap();
    assert_eq!(reopened.get_note_by_id(saved.id), Some(saved));
    assert_eq!(reopened.config().order, NoteOrder::NameAsc);
}

#[tokio::test]
async fn stream_pushes_writes_from_another_thread() {
    let repo = Arc::new(memory_repo(1));
    let mut stream = repo.get_all_notes();

    let writer = {
        let repo = Arc::clone(&repo);
        thread::spawn(move || repo.add_note(Note::new("pushed", "")).unwrap())
    };

    let snapshot = tokio::time::timeout(Duration::from_secs(5), stream.changed())
        .await
        .expect("emission should arrive")
        .expect("repository is alive");
    let saved = writer.join().unwrap();
    assert_eq!(ids(&snapshot), vec![saved.id]);
}

#[tokio::test]
async fn stream_ends_when_repository_is_dropped() {
    let repo = memory_repo(1);
    let mut stream = repo.get_all_notes();
    drop(repo);
    assert!(stream.changed().await.is_none());
    assert!(!stream.has_changed());
}
