//! Data layer module
//!
//! Handles note persistence:
//! - `NoteStore` trait used by the API handlers
//! - PostgreSQL implementation (`Database`)

mod database;
mod models;

use async_trait::async_trait;

pub use database::{ConnectionSettings, Database};
pub use models::*;

use crate::error::AppError;

/// Note persistence operations
///
/// Notes are append-only: there is no update or delete.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// All notes, most recently created first. Empty when the table is empty.
    async fn list_notes(&self) -> Result<Vec<Note>, AppError>;

    /// Insert a note and return it with its assigned `id` and `created_at`.
    async fn create_note(&self, note: &NewNote) -> Result<Note, AppError>;
}
