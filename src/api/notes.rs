//! Note endpoints
//!
//! Routes:
//! - GET /notes - List notes, newest first
//! - POST /notes - Create a note
//! - POST /notes/export - Export all notes to the export bucket

use axum::{
    body::Bytes,
    extract::Extension,
    http::{HeaderMap, StatusCode, header},
    response::Json,
};
use serde::Serialize;
use std::sync::Arc;

use super::body::{MISSING_FIELDS_MESSAGE, NoteInput};
use crate::bootstrap::Services;
use crate::data::Note;
use crate::error::AppError;

/// Export response
#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub message: &'static str,
    pub file: String,
}

/// GET /notes
pub async fn list_notes(
    Extension(services): Extension<Arc<Services>>,
) -> Result<Json<Vec<Note>>, AppError> {
    let notes = services.notes.list_notes().await?;
    Ok(Json(notes))
}

/// POST /notes
///
/// Returns 201 with the stored note, or 400 when title or description
/// is missing. No write happens on 400.
pub async fn create_note(
    Extension(services): Extension<Arc<Services>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Note>), AppError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());

    let new_note = NoteInput::from_body(content_type, &body)
        .ok_or_else(|| AppError::Validation(MISSING_FIELDS_MESSAGE.to_string()))
        .and_then(NoteInput::validate)
        .inspect_err(|_| {
            tracing::warn!(
                content_type = ?content_type,
                size = body.len(),
                "Missing title or description in body"
            );
        })?;

    let note = services
        .notes
        .create_note(&new_note)
        .await
        .map_err(AppError::insert_failed)?;

    tracing::info!(id = note.id, "Note created");
    Ok((StatusCode::CREATED, Json(note)))
}

/// POST /notes/export
///
/// Snapshots the whole table into the export bucket.
pub async fn export_notes(
    Extension(services): Extension<Arc<Services>>,
) -> Result<Json<ExportResponse>, AppError> {
    let notes = services.notes.list_notes().await?;
    let file = services.exporter.export(&notes).await?;

    Ok(Json(ExportResponse {
        message: "Export completed",
        file,
    }))
}
