//! Note exports
//!
//! Writes the full note set as a pretty-printed JSON array to the export
//! bucket. Every export is a new object keyed by its wall-clock time.

use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::Arc;

use super::ObjectStore;
use crate::data::Note;
use crate::error::AppError;

/// Key prefix of all export objects
pub const EXPORT_PREFIX: &str = "note_exports/";

const EXPORT_CONTENT_TYPE: &str = "application/json";

/// Object key for an export taken at `at`
///
/// # Example
/// `note_exports/notes-2025-03-01T09:30:00.000Z.json`
pub fn export_key(at: DateTime<Utc>) -> String {
    format!(
        "{}notes-{}.json",
        EXPORT_PREFIX,
        at.to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}

/// Serializes notes and uploads them to the export bucket
#[derive(Clone)]
pub struct ExportWriter {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl ExportWriter {
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Upload a snapshot of `notes`
    ///
    /// # Returns
    /// Fully-qualified location, e.g. `gs://bucket/note_exports/notes-....json`
    pub async fn export(&self, notes: &[Note]) -> Result<String, AppError> {
        let body = serde_json::to_vec_pretty(notes)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize notes: {e}")))?;
        let key = export_key(Utc::now());

        self.store
            .put_object(&self.bucket, &key, body, EXPORT_CONTENT_TYPE)
            .await?;

        let location = format!("{}://{}/{}", self.store.uri_scheme(), self.bucket, key);
        tracing::info!(%location, count = notes.len(), "Notes exported");
        Ok(location)
    }
}
