//! NoteX - a minimal note-taking backend
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      API Layer (Axum)                        │
//! │  - GET /              browser UI                            │
//! │  - GET/POST /notes    list / create                         │
//! │  - POST /notes/export snapshot to blob storage              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Bootstrap (once per process)                 │
//! │  - Secret Manager credentials                               │
//! │  - PostgreSQL pool + schema                                 │
//! │  - Export storage client                                    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Data Layer                              │
//! │  - PostgreSQL (sqlx)                                        │
//! │  - S3-compatible object storage                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `api`: HTTP handlers
//! - `bootstrap`: lazy one-time initialization
//! - `data`: note persistence
//! - `storage`: object storage and exports
//! - `secrets`: secret store client
//! - `config`: Configuration management
//! - `error`: Error types

pub mod api;
pub mod bootstrap;
pub mod config;
pub mod data;
pub mod error;
pub mod secrets;
pub mod storage;

use axum::{
    Router,
    extract::{Request, State},
    http::{Method, Uri},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::sync::Arc;

/// Largest accepted request body
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Application state shared across all handlers
///
/// Cloned for each request. The secret-derived services live behind
/// `bootstrap` and are only available once it has run.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// One-time initialization of database and storage
    pub bootstrap: Arc<bootstrap::Bootstrap>,
}

impl AppState {
    /// State with explicit collaborators
    pub fn new(
        config: config::AppConfig,
        secrets: Arc<dyn secrets::SecretSource>,
        connector: Arc<dyn bootstrap::Connector>,
    ) -> Self {
        let config = Arc::new(config);
        let bootstrap = bootstrap::Bootstrap::new(config.clone(), secrets, connector);
        Self {
            config,
            bootstrap: Arc::new(bootstrap),
        }
    }

    /// State backed by Secret Manager, PostgreSQL and S3-compatible storage
    ///
    /// Nothing is contacted here; the first request does that.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built
    pub fn from_config(config: config::AppConfig) -> Result<Self, error::AppError> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("notex/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        let secrets = Arc::new(secrets::SecretManagerClient::new(
            http_client,
            &config.secrets,
        ));
        let connector = Arc::new(bootstrap::CloudConnector::new(config.storage.clone()));

        Ok(Self::new(config, secrets, connector))
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> Router {
    use tower::ServiceBuilder;
    use tower_http::{
        catch_panic::CatchPanicLayer, limit::RequestBodyLimitLayer, trace::TraceLayer,
    };

    Router::new()
        // `get` also answers HEAD unless HEAD has its own route
        .route("/", get(api::index).head(not_found).fallback(not_found))
        .route(
            "/notes",
            get(api::list_notes)
                .head(not_found)
                .post(api::create_note)
                .fallback(not_found),
        )
        .route("/notes/export", post(api::export_notes).fallback(not_found))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), ensure_ready))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)),
        )
        .with_state(state)
}

/// Run the one-time initialization before any route
///
/// Adds the initialized `Services` to request extensions.
async fn ensure_ready(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, error::AppError> {
    let services = state.bootstrap.ensure_ready().await?;
    request.extensions_mut().insert(services);
    Ok(next.run(request).await)
}

async fn not_found(method: Method, uri: Uri) -> error::AppError {
    error::AppError::NotFound {
        method: method.to_string(),
        path: uri.path().to_string(),
    }
}

fn handle_panic(panic: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");

    error::AppError::Internal(anyhow::anyhow!("handler panicked: {detail}")).into_response()
}
