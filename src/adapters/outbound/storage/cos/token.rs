use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, header::ACCEPT};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::errors::{StorageError, StorageResult};

const API_KEY_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";

/// Tokens are refreshed this long before they expire
const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// Token granted at `now`, valid for `expires_in` seconds
    fn issued(now: DateTime<Utc>, access_token: String, expires_in: i64) -> StorageResult<Self> {
        let expires_at = Duration::try_seconds(expires_in)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                StorageError::backend(format!("IAM token expiry out of range: {}s", expires_in))
            })?;
        Ok(Self {
            access_token,
            expires_at,
        })
    }

    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::seconds(REFRESH_MARGIN_SECS) > now
    }
}

/// Exchanges an IAM API key for bearer tokens and caches them until
/// shortly before expiry
pub struct IamTokenProvider {
    client: Client,
    token_url: String,
    api_key: String,
    cached: Mutex<Option<CachedToken>>,
}

impl IamTokenProvider {
    pub fn new(client: Client, token_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            token_url: token_url.into(),
            api_key: api_key.into(),
            cached: Mutex::new(None),
        }
    }

    /// Current bearer token, fetching a new one when the cached token is stale
    pub async fn access_token(&self) -> StorageResult<String> {
        // Held across the exchange so concurrent requests share one refresh
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(Utc::now())) {
            return Ok(token.access_token.clone());
        }

        let token = self.request_token().await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    async fn request_token(&self) -> StorageResult<CachedToken> {
        debug!(token_url = %self.token_url, "Requesting IAM token");

        let response = self
            .client
            .post(&self.token_url)
            .header(ACCEPT, "application/json")
            .form(&[
                ("grant_type", API_KEY_GRANT_TYPE),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| StorageError::backend_with_source("Failed to request IAM token", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::backend(format!(
                "IAM token request failed: {} - {}",
                status, body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| StorageError::backend_with_source("Invalid IAM token response", e))?;

        CachedToken::issued(Utc::now(), token.access_token, token.expires_in)
    }
}
