//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration files (config/default.toml, config/local.toml)
//! 3. Environment variables (override)
//!
//! Database credentials and the export bucket are not part of this
//! configuration; they come from the secret store on first request
//! (see [`crate::bootstrap`]).

use serde::Deserialize;

/// Environment variable holding the database host
pub const DB_HOST_ENV: &str = "DB_HOST";

/// Environment variable some hosting platforms use to assign the port
pub const PORT_ENV: &str = "PORT";

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub secrets: SecretsConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 8080)
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Secret store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SecretsConfig {
    /// Project that owns the secrets
    pub project_id: String,
    /// Secret Manager REST base URL
    pub endpoint: String,
    /// Metadata server URL issuing access tokens
    pub token_url: String,
    /// Static bearer token (local development); skips the metadata server
    pub access_token: Option<String>,
    /// Secret version to access (default: "latest")
    pub version: String,
    pub names: SecretNames,
}

/// Logical secret names
#[derive(Debug, Clone, Deserialize)]
pub struct SecretNames {
    pub db_user: String,
    pub db_password: String,
    pub db_name: String,
    pub export_bucket: String,
}

impl SecretsConfig {
    /// Full resource name of a secret version
    ///
    /// # Returns
    /// e.g. "projects/my-project/secrets/db-user/versions/latest"
    pub fn resource_name(&self, secret: &str) -> String {
        format!(
            "projects/{}/secrets/{}/versions/{}",
            self.project_id, secret, self.version
        )
    }
}

/// Database connection configuration
///
/// User, password and database name come from the secret store.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database host; when unset, `DB_HOST` is read at initialization
    pub host: Option<String>,
    /// Port (default: 5432)
    pub port: u16,
    /// Maximum pool connections (default: 5)
    pub max_connections: u32,
}

/// Export storage configuration (S3-compatible API)
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// API endpoint (default: Google Cloud Storage interoperability API)
    pub endpoint: String,
    /// Signing region
    pub region: String,
    /// HMAC access key ID
    pub access_key_id: String,
    /// HMAC secret
    pub secret_access_key: String,
    /// Scheme used when reporting export locations ("gs", "s3", ...)
    pub uri_scheme: String,
    /// Use path-style bucket addressing
    pub force_path_style: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (NOTEX__*)
    /// 5. `PORT`
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("secrets.endpoint", "https://secretmanager.googleapis.com/v1")?
            .set_default(
                "secrets.token_url",
                "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token",
            )?
            .set_default("secrets.version", "latest")?
            .set_default("secrets.names.db_user", "db-user")?
            .set_default("secrets.names.db_password", "db-pass")?
            .set_default("secrets.names.db_name", "db-name")?
            .set_default("secrets.names.export_bucket", "backup-bucket")?
            .set_default("database.port", 5432)?
            .set_default("database.max_connections", 5)?
            .set_default("storage.endpoint", "https://storage.googleapis.com")?
            .set_default("storage.region", "auto")?
            .set_default("storage.uri_scheme", "gs")?
            .set_default("storage.force_path_style", true)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            // Load from config/default.toml if it exists
            .add_source(File::with_name("config/default").required(false))
            // Load from config/local.toml if it exists (overrides default)
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables (NOTEX__*)
            .add_source(
                Environment::with_prefix("NOTEX")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option(
                "server.port",
                std::env::var(PORT_ENV)
                    .ok()
                    .and_then(|port| port.parse::<u16>().ok())
                    .map(i64::from),
            )?
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    fn validate(&self) -> Result<(), crate::error::AppError> {
        if self.secrets.project_id.trim().is_empty() {
            return Err(crate::error::AppError::Config(
                "secrets.project_id must not be empty".to_string(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(crate::error::AppError::Config(
                "database.max_connections must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
