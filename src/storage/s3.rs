//! S3-compatible object storage
//!
//! Google Cloud Storage is reached through its XML interoperability API
//! with HMAC credentials; any other S3-compatible endpoint works as well.

use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;

use super::{ObjectStore, build_storage_http_client};
use crate::config::StorageConfig;
use crate::error::AppError;

/// Object store backed by `aws-sdk-s3`
pub struct S3ObjectStore {
    client: S3Client,
    uri_scheme: String,
}

impl S3ObjectStore {
    /// Create new storage client
    ///
    /// No request is sent; credentials are checked on first upload.
    pub fn new(config: &StorageConfig) -> Self {
        use aws_sdk_s3::config::BehaviorVersion;
        use aws_sdk_s3::config::{Credentials, Region};

        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "notex-export",
        );

        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .http_client(build_storage_http_client())
            .region(Region::new(config.region.clone()))
            .endpoint_url(&config.endpoint)
            .credentials_provider(credentials)
            .force_path_style(config.force_path_style)
            .build();

        Self {
            client: S3Client::from_conf(s3_config),
            uri_scheme: config.uri_scheme.clone(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), AppError> {
        use aws_sdk_s3::primitives::ByteStream;

        let size = body.len();
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Upload of {bucket}/{key} failed: {e}")))?;

        tracing::debug!(%bucket, %key, size, "Object uploaded");
        Ok(())
    }

    fn uri_scheme(&self) -> &str {
        &self.uri_scheme
    }
}
