//! PostgreSQL database operations
//!
//! All note persistence goes through this module.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};

use super::NoteStore;
use super::models::{NewNote, Note, NoteRow};
use crate::error::AppError;

const CREATE_NOTES_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS notes (
        id SERIAL PRIMARY KEY,
        title VARCHAR(255) NOT NULL,
        description TEXT NOT NULL,
        created_at TIMESTAMP NOT NULL DEFAULT NOW()
    )
"#;

/// Resolved connection parameters
///
/// Host comes from the environment; the rest from the secret store.
#[derive(Clone)]
pub struct ConnectionSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
}

impl std::fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl ConnectionSettings {
    /// Plain TCP connect options
    ///
    /// Sessions run in UTC so `NOW()` and the stored `TIMESTAMP` values
    /// are UTC wall-clock times.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
            .ssl_mode(PgSslMode::Disable)
            .options([("timezone", "UTC")])
    }
}

/// Database connection pool wrapper.
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Open the pool and make sure the `notes` table exists.
    ///
    /// # Errors
    /// Returns error if the connection or schema creation fails
    pub async fn connect(settings: &ConnectionSettings) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .connect_with(settings.connect_options())
            .await?;

        let db = Self::from_pool(pool);
        db.ensure_schema().await?;

        tracing::info!(
            host = %settings.host,
            database = %settings.database,
            "Database connected"
        );

        Ok(db)
    }

    /// Wrap an existing pool without touching the schema
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `notes` table if it does not exist yet
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        sqlx::query(CREATE_NOTES_TABLE).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl NoteStore for Database {
    async fn list_notes(&self) -> Result<Vec<Note>, AppError> {
        let rows: Vec<NoteRow> = sqlx::query_as(
            r#"
            SELECT id, title, description, created_at
            FROM notes
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Note::from).collect())
    }

    async fn create_note(&self, note: &NewNote) -> Result<Note, AppError> {
        let row: NoteRow = sqlx::query_as(
            r#"
            INSERT INTO notes (title, description)
            VALUES ($1, $2)
            RETURNING id, title, description, created_at
            "#,
        )
        .bind(&note.title)
        .bind(&note.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }
}
