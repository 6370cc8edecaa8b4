//! One-time runtime initialization
//!
//! The first request after process start reads the database credentials
//! and export bucket from the secret store, opens the connection pool,
//! creates the `notes` table if needed and builds the storage client.
//! The result is cached for the lifetime of the process.
//!
//! Concurrent first requests share one in-flight initialization. A failed
//! initialization is not cached: the next request starts over.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::config::{AppConfig, DB_HOST_ENV, StorageConfig};
use crate::data::{ConnectionSettings, Database, NoteStore};
use crate::error::AppError;
use crate::secrets::SecretSource;
use crate::storage::{ExportWriter, ObjectStore, S3ObjectStore};

/// Values read from the secret store
#[derive(Clone)]
pub struct RuntimeSecrets {
    pub db_user: String,
    pub db_password: String,
    pub db_name: String,
    pub export_bucket: String,
}

impl std::fmt::Debug for RuntimeSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeSecrets")
            .field("db_user", &self.db_user)
            .field("db_password", &"<redacted>")
            .field("db_name", &self.db_name)
            .field("export_bucket", &self.export_bucket)
            .finish()
    }
}

/// Opens the backing services once secrets are known
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open the note store; the `notes` table must exist afterwards
    async fn open_note_store(
        &self,
        settings: &ConnectionSettings,
    ) -> Result<Arc<dyn NoteStore>, AppError>;

    /// Build the export object store client
    fn open_object_store(&self) -> Result<Arc<dyn ObjectStore>, AppError>;
}

/// PostgreSQL + S3-compatible storage
pub struct CloudConnector {
    storage: StorageConfig,
}

impl CloudConnector {
    pub fn new(storage: StorageConfig) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl Connector for CloudConnector {
    async fn open_note_store(
        &self,
        settings: &ConnectionSettings,
    ) -> Result<Arc<dyn NoteStore>, AppError> {
        let db = Database::connect(settings).await?;
        Ok(Arc::new(db))
    }

    fn open_object_store(&self) -> Result<Arc<dyn ObjectStore>, AppError> {
        Ok(Arc::new(S3ObjectStore::new(&self.storage)))
    }
}

/// Services available once initialization succeeded
pub struct Services {
    pub notes: Arc<dyn NoteStore>,
    pub exporter: ExportWriter,
}

/// Lazily initialized runtime
pub struct Bootstrap {
    config: Arc<AppConfig>,
    secrets: Arc<dyn SecretSource>,
    connector: Arc<dyn Connector>,
    ready: OnceCell<Arc<Services>>,
}

impl Bootstrap {
    pub fn new(
        config: Arc<AppConfig>,
        secrets: Arc<dyn SecretSource>,
        connector: Arc<dyn Connector>,
    ) -> Self {
        Self {
            config,
            secrets,
            connector,
            ready: OnceCell::new(),
        }
    }

    /// Return the initialized services, initializing them on first use.
    ///
    /// Callers arriving while an initialization is running wait for it.
    ///
    /// # Errors
    /// Propagates any secret, configuration or connection failure.
    pub async fn ensure_ready(&self) -> Result<Arc<Services>, AppError> {
        self.ready
            .get_or_try_init(|| self.initialize())
            .await
            .map(Arc::clone)
    }

    pub fn is_ready(&self) -> bool {
        self.ready.initialized()
    }

    async fn initialize(&self) -> Result<Arc<Services>, AppError> {
        tracing::info!("Initializing runtime...");

        let secrets = self.load_secrets().await?;
        tracing::info!("Secrets loaded");

        let host = database_host(
            self.config.database.host.as_deref(),
            std::env::var(DB_HOST_ENV).ok(),
        )
        .ok_or_else(|| AppError::Config(format!("{DB_HOST_ENV} env var is not set")))?;

        let settings = ConnectionSettings {
            host,
            port: self.config.database.port,
            user: secrets.db_user,
            password: secrets.db_password,
            database: secrets.db_name,
            max_connections: self.config.database.max_connections,
        };

        let notes = self.connector.open_note_store(&settings).await?;
        let objects = self.connector.open_object_store()?;
        let exporter = ExportWriter::new(objects, secrets.export_bucket);

        tracing::info!(bucket = %exporter.bucket(), "Runtime initialized");

        Ok(Arc::new(Services { notes, exporter }))
    }

    /// Read all four secrets concurrently
    async fn load_secrets(&self) -> Result<RuntimeSecrets, AppError> {
        let config = &self.config.secrets;
        let names = &config.names;

        let user = config.resource_name(&names.db_user);
        let password = config.resource_name(&names.db_password);
        let database = config.resource_name(&names.db_name);
        let bucket = config.resource_name(&names.export_bucket);

        let (db_user, db_password, db_name, export_bucket) = tokio::try_join!(
            self.secrets.access(&user),
            self.secrets.access(&password),
            self.secrets.access(&database),
            self.secrets.access(&bucket),
        )?;

        Ok(RuntimeSecrets {
            db_user: db_user.trim().to_string(),
            db_password,
            db_name: db_name.trim().to_string(),
            export_bucket: export_bucket.trim().to_string(),
        })
    }
}

/// Configured `database.host`, else the `DB_HOST` value; blanks count as unset
fn database_host(configured: Option<&str>, from_env: Option<String>) -> Option<String> {
    configured
        .map(str::to_owned)
        .into_iter()
        .chain(from_env)
        .map(|host| host.trim().to_string())
        .find(|host| !host.is_empty())
}
