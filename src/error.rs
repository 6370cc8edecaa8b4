//! Error types for NoteX
//!
//! All errors in the application are converted to `AppError`,
//! which implements `IntoResponse` for proper HTTP error responses.
//! Server-side failures are logged in full and reported to the client
//! with a fixed message only.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Message returned for every 500 that has no more specific wording
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Message returned when note insertion fails
pub const INSERT_FAILED_MESSAGE: &str = "DB insert failed";

/// Application-wide error type
///
/// A closed set of failure kinds. Each variant maps to a fixed status
/// code in `into_response`.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or invalid configuration (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Secret store access failed (500)
    #[error("Secret store error: {0}")]
    Secret(String),

    /// Client input rejected (400)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database error (500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Note insertion failed (500, distinct message)
    #[error("Note insert failed: {0}")]
    InsertFailed(Box<AppError>),

    /// Object storage error (500)
    #[error("Storage error: {0}")]
    Storage(String),

    /// No route for method and path (404)
    #[error("No route for {method} {path}")]
    NotFound { method: String, path: String },

    /// HTTP client error (500)
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl AppError {
    /// Wrap a store failure raised while inserting a note
    pub fn insert_failed(source: AppError) -> Self {
        AppError::InsertFailed(Box::new(source))
    }

    /// HTTP status this error maps to
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Config(_)
            | AppError::Secret(_)
            | AppError::Database(_)
            | AppError::InsertFailed(_)
            | AppError::Storage(_)
            | AppError::HttpClient(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    /// Convert error to HTTP response
    ///
    /// Client errors echo their message; server errors are logged here
    /// and replaced by a fixed message.
    fn into_response(self) -> Response {
        use axum::Json;

        let status = self.status();
        let body = match &self {
            AppError::Validation(msg) => serde_json::json!({ "error": msg }),
            AppError::NotFound { method, path } => serde_json::json!({
                "error": "Not found",
                "method": method,
                "path": path,
            }),
            AppError::InsertFailed(source) => {
                tracing::error!(error = %source, "Error inserting note into database");
                serde_json::json!({ "error": INSERT_FAILED_MESSAGE })
            }
            _ => {
                tracing::error!(error = %self, "Request failed");
                serde_json::json!({ "error": INTERNAL_ERROR_MESSAGE })
            }
        };

        (status, Json(body)).into_response()
    }
}
