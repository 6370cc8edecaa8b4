//! Export storage module
//!
//! Handles:
//! - Object uploads to an S3-compatible bucket (Google Cloud Storage by default)
//! - Note exports (JSON snapshots of the whole table)

mod export;
mod s3;

use async_trait::async_trait;

pub use export::{EXPORT_PREFIX, ExportWriter, export_key};
pub use s3::S3ObjectStore;

use crate::error::AppError;

/// Write access to blob storage
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `body` under `bucket`/`key`, replacing any existing object
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), AppError>;

    /// Scheme used in reported object locations (e.g. "gs")
    fn uri_scheme(&self) -> &str;
}

pub(crate) fn build_storage_http_client() -> aws_sdk_s3::config::SharedHttpClient {
    use aws_smithy_runtime::client::http::hyper_014::HyperClientBuilder;

    let https_connector = hyper_rustls::HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .enable_http2()
        .build();

    HyperClientBuilder::new().build(https_connector)
}
