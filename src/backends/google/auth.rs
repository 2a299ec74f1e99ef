//! OAuth2 access tokens for Google Cloud REST calls.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, error};

use crate::error::BackendError;

/// Token endpoint of the GCE / Cloud Run metadata server.
pub const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Tokens are refreshed this long before they expire.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Supplies bearer tokens for Google Cloud APIs.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn get_token(&self) -> Result<String, BackendError>;
}

/// A fixed token, e.g. from `gcloud auth print-access-token`.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn get_token(&self) -> Result<String, BackendError> {
        Ok(self.token.clone())
    }
}

#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    token: String,
    refresh_at: Instant,
}

/// Fetches tokens for the attached service account from the metadata
/// server and caches them until shortly before expiry.
pub struct MetadataTokenProvider {
    http: reqwest::Client,
    url: String,
    cached: RwLock<Option<CachedToken>>,
}

impl MetadataTokenProvider {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_url(http, METADATA_TOKEN_URL)
    }

    pub fn with_url(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
            cached: RwLock::new(None),
        }
    }

    async fn fetch(&self) -> Result<MetadataToken, BackendError> {
        let response = self
            .http
            .get(&self.url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Metadata server unreachable");
                BackendError::Auth(format!("Metadata server unreachable: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Auth(format!(
                "Metadata server returned {status}: {body}"
            )));
        }

        response
            .json::<MetadataToken>()
            .await
            .map_err(|e| BackendError::Auth(format!("Invalid metadata token response: {e}")))
    }
}

#[async_trait]
impl TokenProvider for MetadataTokenProvider {
    async fn get_token(&self) -> Result<String, BackendError> {
        {
            let cached = self.cached.read().await;
            if let Some(cached) = cached.as_ref() {
                if Instant::now() < cached.refresh_at {
                    return Ok(cached.token.clone());
                }
            }
        }

        let mut cached = self.cached.write().await;
        // Another task may have refreshed while we waited for the lock.
        if let Some(current) = cached.as_ref() {
            if Instant::now() < current.refresh_at {
                return Ok(current.token.clone());
            }
        }

        let fresh = self.fetch().await?;
        let lifetime = Duration::from_secs(fresh.expires_in).saturating_sub(REFRESH_MARGIN);
        debug!(expires_in = fresh.expires_in, "Fetched access token");

        *cached = Some(CachedToken {
            token: fresh.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });

        Ok(fresh.access_token)
    }
}
