//! Durable note table contract and SQLite implementation.
//!
//! # Responsibility
//! - Define the table-level operations the repository persists through.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `insert` of a note with id `0` lets SQLite assign a fresh positive id.
//! - Every method returns only after SQLite has committed the statement.
//! - Read paths reject rows that cannot form a valid `Note`.

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::note::{Note, NoteId, UNSAVED_NOTE_ID};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    created_time,
    updated_time
FROM notes";

const NOTE_COLUMNS: [&str; 5] = ["id", "name", "description", "created_time", "updated_time"];

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure of the durable store.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Store cannot currently accept reads or writes.
    Unavailable(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Unavailable(message) => write!(f, "note store unavailable: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable table of notes consumed by [`crate::NoteRepository`].
///
/// Writers take `&mut self`; the repository serializes access.
pub trait NoteStore {
    /// Inserts `note` and returns its id. Id `0` requests a fresh id.
    fn insert(&mut self, note: &Note) -> StoreResult<NoteId>;
    /// Overwrites the row matching `note.id`. Returns `false` if none matched.
    fn update(&mut self, note: &Note) -> StoreResult<bool>;
    /// Deletes one row. Returns `false` if it did not exist.
    fn delete(&mut self, id: NoteId) -> StoreResult<bool>;
    /// Deletes all given rows atomically and returns how many existed.
    fn delete_many(&mut self, ids: &[NoteId]) -> StoreResult<usize>;
    fn get(&self, id: NoteId) -> StoreResult<Option<Note>>;
    fn query_all(&self) -> StoreResult<Vec<Note>>;
}

/// SQLite-backed note table.
pub struct SqliteNoteStore {
    conn: Connection,
}

impl SqliteNoteStore {
    /// Wraps a migrated connection, verifying the `notes` table shape.
    pub fn try_new(conn: Connection) -> StoreResult<Self> {
        ensure_notes_table_ready(&conn)?;
        Ok(Self { conn })
    }

    /// Opens (or creates) a note database file.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::try_new(open_db(path)?)
    }

    /// Opens a private in-memory note database.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }
}

impl NoteStore for SqliteNoteStore {
    fn insert(&mut self, note: &Note) -> StoreResult<NoteId> {
        if note.id == UNSAVED_NOTE_ID {
            self.conn.execute(
                "INSERT INTO notes (name, description, created_time, updated_time)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    note.name.as_str(),
                    note.description.as_str(),
                    note.created_time,
                    note.updated_time,
                ],
            )?;
            return Ok(self.conn.last_insert_rowid());
        }

        self.conn.execute(
            "INSERT INTO notes (id, name, description, created_time, updated_time)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                note.id,
                note.name.as_str(),
                note.description.as_str(),
                note.created_time,
                note.updated_time,
            ],
        )?;
        Ok(note.id)
    }

    fn update(&mut self, note: &Note) -> StoreResult<bool> {
        let changed = self.conn.execute(
            "UPDATE notes
             SET
                name = ?2,
                description = ?3,
                created_time = ?4,
                updated_time = ?5
             WHERE id = ?1;",
            params![
                note.id,
                note.name.as_str(),
                note.description.as_str(),
                note.created_time,
                note.updated_time,
            ],
        )?;
        Ok(changed > 0)
    }

    fn delete(&mut self, id: NoteId) -> StoreResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM notes WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn delete_many(&mut self, ids: &[NoteId]) -> StoreResult<usize> {
        let tx = self.conn.transaction()?;
        let mut removed = 0;
        {
            let mut stmt = tx.prepare("DELETE FROM notes WHERE id = ?1;")?;
            for id in ids {
                removed += stmt.execute([id])?;
            }
        }
        tx.commit()?;
        Ok(removed)
    }

    fn get(&self, id: NoteId) -> StoreResult<Option<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_note_row(row)?)),
            None => Ok(None),
        }
    }

    fn query_all(&self) -> StoreResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL} ORDER BY updated_time DESC, id DESC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }
}

fn parse_note_row(row: &Row<'_>) -> StoreResult<Note> {
    let id: NoteId = row.get("id")?;
    if id <= UNSAVED_NOTE_ID {
        return Err(StoreError::InvalidData(format!(
            "non-positive id `{id}` in notes.id"
        )));
    }

    Ok(Note {
        id,
        name: row.get::<_, Option<String>>("name")?.unwrap_or_default(),
        description: row
            .get::<_, Option<String>>("description")?
            .unwrap_or_default(),
        created_time: row.get("created_time")?,
        updated_time: row.get("updated_time")?,
    })
}

fn ensure_notes_table_ready(conn: &Connection) -> StoreResult<()> {
    if !table_exists(conn, "notes")? {
        return Err(StoreError::MissingRequiredTable("notes"));
    }
    for column in NOTE_COLUMNS {
        if !table_has_column(conn, "notes", column)? {
            return Err(StoreError::MissingRequiredColumn {
                table: "notes",
                column,
            });
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> StoreResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
