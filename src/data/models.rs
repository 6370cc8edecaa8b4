//! Data models
//!
//! Rust structs representing the `notes` table.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted note
///
/// `id` and `created_at` are assigned by the database on insert and never
/// change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// A note about to be inserted
///
/// Both fields are non-empty; see [`crate::api::NoteInput::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    pub title: String,
    pub description: String,
}

/// Row shape of the `notes` table
///
/// `created_at` is a `TIMESTAMP` column written in a UTC session.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct NoteRow {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub created_at: NaiveDateTime,
}

impl From<NoteRow> for Note {
    fn from(row: NoteRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            created_at: row.created_at.and_utc(),
        }
    }
}
