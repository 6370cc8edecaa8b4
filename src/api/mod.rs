//! API layer
//!
//! HTTP handlers for:
//! - Browser UI (`/`)
//! - Notes API (`/notes`, `/notes/export`)

mod body;
mod notes;
mod ui;

pub use body::{MISSING_FIELDS_MESSAGE, NoteInput};
pub use notes::{ExportResponse, create_note, export_notes, list_notes};
pub use ui::index;
