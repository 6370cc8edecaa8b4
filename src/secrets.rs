//! Secret store access
//!
//! Database credentials and the export bucket name live in Google Secret
//! Manager. Values are read through its REST API with a bearer token from
//! the instance metadata server (or a statically configured token).

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64_STANDARD};
use serde::Deserialize;

use crate::config::SecretsConfig;
use crate::error::AppError;

/// Source of secret values
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SecretSource: Send + Sync {
    /// Read a secret version by its full resource name
    /// (`projects/<p>/secrets/<name>/versions/<v>`)
    async fn access(&self, resource: &str) -> Result<String, AppError>;
}

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct AccessSecretVersionResponse {
    payload: SecretPayload,
}

#[derive(Debug, Deserialize)]
struct SecretPayload {
    /// Base64-encoded secret bytes
    data: String,
}

fn decode_payload(resource: &str, data: &str) -> Result<String, AppError> {
    let bytes = BASE64_STANDARD
        .decode(data.trim())
        .map_err(|_| AppError::Secret(format!("{resource}: payload is not valid base64")))?;
    String::from_utf8(bytes)
        .map_err(|_| AppError::Secret(format!("{resource}: payload is not valid UTF-8")))
}

/// Secret Manager REST client
pub struct SecretManagerClient {
    http: reqwest::Client,
    endpoint: String,
    token_url: String,
    static_token: Option<String>,
}

impl SecretManagerClient {
    pub fn new(http: reqwest::Client, config: &SecretsConfig) -> Self {
        Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            token_url: config.token_url.clone(),
            static_token: config
                .access_token
                .as_deref()
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(ToOwned::to_owned),
        }
    }

    async fn access_token(&self) -> Result<String, AppError> {
        if let Some(token) = &self.static_token {
            return Ok(token.clone());
        }

        let response = self
            .http
            .get(&self.token_url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Secret(format!(
                "metadata server returned HTTP {status}"
            )));
        }

        let token: AccessTokenResponse = response.json().await?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl SecretSource for SecretManagerClient {
    async fn access(&self, resource: &str) -> Result<String, AppError> {
        let token = self.access_token().await?;
        let url = format!("{}/{}:access", self.endpoint, resource);

        let response = self.http.get(&url).bearer_auth(token).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Secret(format!(
                "{resource}: secret store returned HTTP {status}"
            )));
        }

        let version: AccessSecretVersionResponse = response.json().await?;
        tracing::debug!(%resource, "Secret accessed");
        decode_payload(resource, &version.payload.data)
    }
}
