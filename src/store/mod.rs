//! Note storage with SQLite
//!
//! Every contact has at most one note. `save` is an upsert keyed by the
//! contact id and runs inside a single write transaction, so concurrent
//! writers on the same database file cannot interleave between the lookup
//! and the write.

mod schema;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use uuid::Uuid;

use crate::error::Result;

pub use schema::SCHEMA;

/// A free-text note attached to one contact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactNote {
    pub id: String,
    pub contact_id: String,
    pub content: String,
    /// Unix millis
    pub created_at: i64,
    /// Unix millis
    pub updated_at: i64,
}

/// Result of [`NoteStore::save`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(ContactNote),
    /// The content was blank, so the contact's note was removed instead
    Deleted,
}

impl SaveOutcome {
    pub fn note(&self) -> Option<&ContactNote> {
        match self {
            SaveOutcome::Saved(note) => Some(note),
            SaveOutcome::Deleted => None,
        }
    }
}

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const NOTE_COLUMNS: &str = "id, contactId, content, createdAt, updatedAt";

pub struct NoteStore {
    conn: Connection,
}

impl NoteStore {
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path).inspect_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "failed to open notes database");
        })?;
        // Other processes may hold the write lock; wait for them instead of failing.
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA).inspect_err(|e| {
            tracing::error!(error = %e, "failed to initialize notes schema");
        })?;
        tracing::debug!("notes database initialized");
        Ok(())
    }

    // ============================================
    // READS
    // ============================================

    pub fn get_by_contact(&self, contact_id: &str) -> Result<Option<ContactNote>> {
        find_note(&self.conn, contact_id)
            .inspect_err(|e| tracing::error!(contact_id, error = %e, "failed to get note"))
            .map_err(Into::into)
    }

    /// All notes, most recently updated first
    pub fn list_all(&self) -> Result<Vec<ContactNote>> {
        self.query_notes()
            .inspect_err(|e| tracing::error!(error = %e, "failed to list notes"))
            .map_err(Into::into)
    }

    /// Notes whose content contains `query`, ignoring case
    pub fn search(&self, query: &str) -> Result<Vec<ContactNote>> {
        // SQLite's LIKE only folds ASCII, so the match happens here.
        let needle = query.to_lowercase();
        let notes = self.list_all()?;
        Ok(notes
            .into_iter()
            .filter(|note| note.content.to_lowercase().contains(&needle))
            .collect())
    }

    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))
            .inspect_err(|e| tracing::error!(error = %e, "failed to count notes"))?;
        Ok(count as usize)
    }

    fn query_notes(&self) -> rusqlite::Result<Vec<ContactNote>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM notes ORDER BY updatedAt DESC, createdAt DESC",
            NOTE_COLUMNS
        ))?;
        let rows = stmt.query_map([], map_note)?;
        rows.collect()
    }

    // ============================================
    // WRITES
    // ============================================

    /// Create or replace the note for `contact_id`.
    ///
    /// The content is trimmed first. Blank content removes the note and
    /// returns [`SaveOutcome::Deleted`].
    pub fn save(&self, contact_id: &str, content: &str) -> Result<SaveOutcome> {
        let content = content.trim();
        if content.is_empty() {
            self.delete(contact_id)?;
            return Ok(SaveOutcome::Deleted);
        }

        let note = self
            .upsert(contact_id, content)
            .inspect_err(|e| tracing::error!(contact_id, error = %e, "failed to save note"))?;
        Ok(SaveOutcome::Saved(note))
    }

    fn upsert(&self, contact_id: &str, content: &str) -> rusqlite::Result<ContactNote> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        let now = Utc::now().timestamp_millis();

        let note = match find_note(&tx, contact_id)? {
            Some(mut note) => {
                // Never move backwards, even if the wall clock does.
                let updated_at = now.max(note.updated_at);
                tx.execute(
                    "UPDATE notes SET content = ?1, updatedAt = ?2 WHERE id = ?3",
                    params![content, updated_at, note.id],
                )?;
                // Collapse duplicates left behind by older, non-transactional writers
                tx.execute(
                    "DELETE FROM notes WHERE contactId = ?1 AND id != ?2",
                    params![contact_id, note.id],
                )?;
                note.content = content.to_string();
                note.updated_at = updated_at;
                note
            }
            None => {
                let note = ContactNote {
                    id: Uuid::new_v4().to_string(),
                    contact_id: contact_id.to_string(),
                    content: content.to_string(),
                    created_at: now,
                    updated_at: now,
                };
                tx.execute(
                    "INSERT INTO notes (id, contactId, content, createdAt, updatedAt)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        note.id,
                        note.contact_id,
                        note.content,
                        note.created_at,
                        note.updated_at
                    ],
                )?;
                note
            }
        };

        tx.commit()?;
        tracing::debug!(contact_id, note_id = %note.id, "note saved");
        Ok(note)
    }

    /// Remove the note for `contact_id`. Deleting a missing note is a no-op.
    pub fn delete(&self, contact_id: &str) -> Result<()> {
        let removed = self
            .conn
            .execute("DELETE FROM notes WHERE contactId = ?", params![contact_id])
            .inspect_err(|e| tracing::error!(contact_id, error = %e, "failed to delete note"))?;
        tracing::debug!(contact_id, removed, "note deleted");
        Ok(())
    }
}

fn find_note(conn: &Connection, contact_id: &str) -> rusqlite::Result<Option<ContactNote>> {
    conn.query_row(
        &format!(
            "SELECT {} FROM notes WHERE contactId = ? ORDER BY updatedAt DESC LIMIT 1",
            NOTE_COLUMNS
        ),
        params![contact_id],
        map_note,
    )
    .optional()
}

fn map_note(row: &Row) -> rusqlite::Result<ContactNote> {
    Ok(ContactNote {
        id: row.get(0)?,
        contact_id: row.get(1)?,
        content: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}
