//! Common test utilities for E2E tests
//!
//! The server runs the real router; the secret store, database and
//! object storage are replaced by in-memory doubles.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use notex::bootstrap::Connector;
use notex::data::{ConnectionSettings, NewNote, Note, NoteStore};
use notex::error::AppError;
use notex::secrets::SecretSource;
use notex::storage::ObjectStore;
use notex::{AppState, config};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

/// In-memory `notes` table
#[derive(Default)]
pub struct MemoryNoteStore {
    notes: Mutex<Vec<Note>>,
    pub fail_inserts: AtomicBool,
}

impl MemoryNoteStore {
    pub fn count(&self) -> usize {
        self.notes.lock().unwrap().len()
    }
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    async fn list_notes(&self) -> Result<Vec<Note>, AppError> {
        let mut notes = self.notes.lock().unwrap().clone();
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(notes)
    }

    async fn create_note(&self, note: &NewNote) -> Result<Note, AppError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }

        let mut notes = self.notes.lock().unwrap();
        let id = notes.iter().map(|n| n.id).max().unwrap_or(0) + 1;
        let mut created_at = Utc::now();
        if let Some(last) = notes.iter().map(|n| n.created_at).max() {
            if created_at <= last {
                created_at = last + chrono::Duration::microseconds(1);
            }
        }

        let note = Note {
            id,
            title: note.title.clone(),
            description: note.description.clone(),
            created_at,
        };
        notes.push(note.clone());
        Ok(note)
    }
}

/// Uploaded object
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bucket: String,
    pub key: String,
    pub body: Vec<u8>,
    pub content_type: String,
}

/// In-memory object storage
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<Vec<StoredObject>>,
}

impl MemoryObjectStore {
    pub fn objects(&self) -> Vec<StoredObject> {
        self.objects.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), AppError> {
        self.objects.lock().unwrap().push(StoredObject {
            bucket: bucket.to_string(),
            key: key.to_string(),
            body,
            content_type: content_type.to_string(),
        });
        Ok(())
    }

    fn uri_scheme(&self) -> &str {
        "gs"
    }
}

/// Secret store that counts accesses
pub struct CountingSecrets {
    pub calls: AtomicUsize,
    pub failing: AtomicBool,
    delay: Duration,
}

impl CountingSecrets {
    pub fn new(delay: Duration) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            delay,
        }
    }
}

#[async_trait]
impl SecretSource for CountingSecrets {
    async fn access(&self, resource: &str) -> Result<String, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;

        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Secret(format!("{resource}: permission denied")));
        }

        let value = match resource.rsplit('/').nth(2) {
            Some("db-user") => "notex",
            Some("db-pass") => "s3cr3t",
            Some("db-name") => "notes",
            Some("backup-bucket") => "notex-exports",
            _ => return Err(AppError::Secret(format!("{resource}: not found"))),
        };
        Ok(value.to_string())
    }
}

/// Hands out the shared in-memory stores
pub struct TestConnector {
    pub notes: Arc<MemoryNoteStore>,
    pub objects: Arc<MemoryObjectStore>,
    pub opened: AtomicUsize,
    pub last_settings: Mutex<Option<ConnectionSettings>>,
}

#[async_trait]
impl Connector for TestConnector {
    async fn open_note_store(
        &self,
        settings: &ConnectionSettings,
    ) -> Result<Arc<dyn NoteStore>, AppError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        *self.last_settings.lock().unwrap() = Some(settings.clone());
        Ok(self.notes.clone())
    }

    fn open_object_store(&self) -> Result<Arc<dyn ObjectStore>, AppError> {
        Ok(self.objects.clone())
    }
}

/// Configuration pointing at nothing real
pub fn test_config() -> config::AppConfig {
    config::AppConfig {
        server: config::ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Let OS assign port
        },
        secrets: config::SecretsConfig {
            project_id: "notex-test".to_string(),
            endpoint: "http://127.0.0.1:9/v1".to_string(),
            token_url: "http://127.0.0.1:9/token".to_string(),
            access_token: None,
            version: "latest".to_string(),
            names: config::SecretNames {
                db_user: "db-user".to_string(),
                db_password: "db-pass".to_string(),
                db_name: "db-name".to_string(),
                export_bucket: "backup-bucket".to_string(),
            },
        },
        database: config::DatabaseConfig {
            host: Some("db.internal".to_string()),
            port: 5432,
            max_connections: 5,
        },
        storage: config::StorageConfig {
            endpoint: "http://127.0.0.1:9".to_string(),
            region: "auto".to_string(),
            access_key_id: "test-key".to_string(),
            secret_access_key: "test-secret".to_string(),
            uri_scheme: "gs".to_string(),
            force_path_style: true,
        },
        logging: config::LoggingConfig {
            level: "info".to_string(),
            format: "pretty".to_string(),
        },
    }
}

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub client: reqwest::Client,
    pub secrets: Arc<CountingSecrets>,
    pub connector: Arc<TestConnector>,
}

impl TestServer {
    /// Create a new test server instance
    pub async fn new() -> Self {
        Self::with_options(test_config(), Duration::ZERO).await
    }

    /// Create a test server with custom config and secret latency
    pub async fn with_options(config: config::AppConfig, secret_delay: Duration) -> Self {
        let secrets = Arc::new(CountingSecrets::new(secret_delay));
        let connector = Arc::new(TestConnector {
            notes: Arc::new(MemoryNoteStore::default()),
            objects: Arc::new(MemoryObjectStore::default()),
            opened: AtomicUsize::new(0),
            last_settings: Mutex::new(None),
        });

        let state = AppState::new(config, secrets.clone(), connector.clone());

        // Create HTTP client
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        let app = notex::build_router(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr: addr_str,
            state,
            client,
            secrets,
            connector,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    pub fn notes(&self) -> &MemoryNoteStore {
        &self.connector.notes
    }

    pub fn objects(&self) -> &MemoryObjectStore {
        &self.connector.objects
    }

    /// POST /notes with a JSON body
    pub async fn create_note(&self, title: &str, description: &str) -> reqwest::Response {
        self.client
            .post(self.url("/notes"))
            .json(&serde_json::json!({ "title": title, "description": description }))
            .send()
            .await
            .unwrap()
    }

    /// GET /notes, decoded
    pub async fn list_notes(&self) -> Vec<Note> {
        let response = self.client.get(self.url("/notes")).send().await.unwrap();
        assert_eq!(response.status(), 200);
        response.json().await.unwrap()
    }
}

/// Parse an RFC 3339 timestamp from a JSON value
pub fn timestamp(value: &serde_json::Value) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value.as_str().expect("timestamp is a string"))
        .expect("timestamp is RFC 3339")
        .with_timezone(&Utc)
}
