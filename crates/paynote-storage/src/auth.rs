//! OAuth access tokens for the Google APIs
//!
//! Three sources, tried in this order at startup:
//! 1. service account JSON given inline (`SA_CREDENTIALS_JSON`)
//! 2. service account JSON file (`SA_CREDENTIALS_PATH`)
//! 3. the GCE metadata server (application default credentials on Cloud Run/Functions)
//!
//! Tokens are cached until shortly before they expire.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use paynote_core::GoogleConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{StoreError, StoreResult};

/// OAuth scopes needed for folder/file management and ledger writes.
pub const GOOGLE_SCOPES: &str =
    "https://www.googleapis.com/auth/drive https://www.googleapis.com/auth/spreadsheets";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Refresh this long before the provider's expiry
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Something that can hand out a bearer token for the Google APIs.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> StoreResult<String>;
}

/// Fixed token (tests, or tokens minted outside the process).
#[derive(Debug, Clone)]
pub struct StaticTokenSource(pub String);

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn access_token(&self) -> StoreResult<String> {
        Ok(self.0.clone())
    }
}

/// Fields of a service account key file that the JWT bearer flow uses.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Shared token cache; concurrent refreshes are harmless, the last one wins.
#[derive(Default)]
struct TokenCache {
    inner: RwLock<Option<CachedToken>>,
}

impl TokenCache {
    async fn get(&self) -> Option<String> {
        let guard = self.inner.read().await;
        guard
            .as_ref()
            .filter(|token| token.expires_at > Utc::now())
            .map(|token| token.value.clone())
    }

    async fn put(&self, response: &TokenResponse) {
        let lifetime = (response.expires_in - EXPIRY_MARGIN_SECS).max(0);
        *self.inner.write().await = Some(CachedToken {
            value: response.access_token.clone(),
            expires_at: Utc::now() + ChronoDuration::seconds(lifetime),
        });
    }
}

/// JWT bearer grant with a service account key.
pub struct ServiceAccountTokenSource {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    http_client: reqwest::Client,
    cache: TokenCache,
}

impl ServiceAccountTokenSource {
    pub fn new(key: ServiceAccountKey, http_client: reqwest::Client) -> StoreResult<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
            StoreError::ConfigError(format!("Invalid service account private key: {}", e))
        })?;

        Ok(Self {
            key,
            encoding_key,
            http_client,
            cache: TokenCache::default(),
        })
    }

    pub fn from_json(json: &str, http_client: reqwest::Client) -> StoreResult<Self> {
        let key: ServiceAccountKey = serde_json::from_str(json).map_err(|e| {
            StoreError::ConfigError(format!("Invalid service account JSON: {}", e))
        })?;
        Self::new(key, http_client)
    }

    fn assertion(&self) -> StoreResult<String> {
        let now = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: GOOGLE_SCOPES,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| StoreError::AuthFailed(format!("Failed to sign assertion: {}", e)))
    }
}

#[async_trait]
impl TokenSource for ServiceAccountTokenSource {
    async fn access_token(&self) -> StoreResult<String> {
        if let Some(token) = self.cache.get().await {
            return Ok(token);
        }

        let assertion = self.assertion()?;
        let response = self
            .http_client
            .post(&self.key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| StoreError::AuthFailed(format!("Token request failed: {}", e)))?;

        let token = read_token_response(response).await?;
        self.cache.put(&token).await;
        tracing::debug!(
            client_email = %self.key.client_email,
            expires_in = token.expires_in,
            "Obtained Google access token"
        );
        Ok(token.access_token)
    }
}

/// Tokens from the instance metadata server.
pub struct MetadataServerTokenSource {
    url: String,
    http_client: reqwest::Client,
    cache: TokenCache,
}

impl MetadataServerTokenSource {
    pub fn new(http_client: reqwest::Client) -> Self {
        Self {
            url: METADATA_TOKEN_URL.to_string(),
            http_client,
            cache: TokenCache::default(),
        }
    }
}

#[async_trait]
impl TokenSource for MetadataServerTokenSource {
    async fn access_token(&self) -> StoreResult<String> {
        if let Some(token) = self.cache.get().await {
            return Ok(token);
        }

        let response = self
            .http_client
            .get(&self.url)
            .query(&[("scopes", GOOGLE_SCOPES.replace(' ', ","))])
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| StoreError::AuthFailed(format!("Metadata server unreachable: {}", e)))?;

        let token = read_token_response(response).await?;
        self.cache.put(&token).await;
        Ok(token.access_token)
    }
}

async fn read_token_response(response: reqwest::Response) -> StoreResult<TokenResponse> {
    let status = response.status();
    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(StoreError::AuthFailed(format!(
            "Token endpoint returned {}: {}",
            status, error_text
        )));
    }

    response
        .json()
        .await
        .map_err(|e| StoreError::AuthFailed(format!("Invalid token response: {}", e)))
}

/// Pick the token source described by the configuration.
pub async fn token_source_from_config(
    config: &GoogleConfig,
    http_client: reqwest::Client,
) -> StoreResult<Arc<dyn TokenSource>> {
    if let Some(json) = &config.credentials_json {
        tracing::info!("Using inline service account credentials");
        return Ok(Arc::new(ServiceAccountTokenSource::from_json(
            json,
            http_client,
        )?));
    }

    let path = Path::new(&config.credentials_path);
    if tokio::fs::try_exists(path).await.unwrap_or(false) {
        let json = tokio::fs::read_to_string(path).await.map_err(|e| {
            StoreError::ConfigError(format!(
                "Failed to read service account file {}: {}",
                path.display(),
                e
            ))
        })?;
        tracing::info!(path = %path.display(), "Using service account file");
        return Ok(Arc::new(ServiceAccountTokenSource::from_json(
            &json,
            http_client,
        )?));
    }

    tracing::info!("No service account configured, using the metadata server");
    Ok(Arc::new(MetadataServerTokenSource::new(http_client)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_token_source() {
        let source = StaticTokenSource("ya29.test".to_string());
        assert_eq!(source.access_token().await.unwrap(), "ya29.test");
    }

    #[test]
    fn test_service_account_key_defaults_token_uri() {
        let key: ServiceAccountKey = serde_json::from_str(
            r#"{"client_email":"bot@project.iam.gserviceaccount.com","private_key":"pem"}"#,
        )
        .unwrap();
        assert_eq!(key.token_uri, DEFAULT_TOKEN_URI);
        assert!(key.private_key_id.is_none());
    }

    #[test]
    fn test_invalid_private_key_is_config_error() {
        let json = r#"{"client_email":"bot@x","private_key":"not a pem"}"#;
        let result = ServiceAccountTokenSource::from_json(json, reqwest::Client::new());
        assert!(matches!(result, Err(StoreError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_cache_returns_fresh_token_only() {
        let cache = TokenCache::default();
        assert!(cache.get().await.is_none());

        cache
            .put(&TokenResponse {
                access_token: "fresh".to_string(),
                expires_in: 3600,
            })
            .await;
        assert_eq!(cache.get().await.as_deref(), Some("fresh"));

        // Lifetime shorter than the margin is treated as already expired
        cache
            .put(&TokenResponse {
                access_token: "stale".to_string(),
                expires_in: 10,
            })
            .await;
        assert!(cache.get().await.is_none());
    }

    #[tokio::test]
    async fn test_missing_credentials_fall_back_to_metadata_server() {
        let config = GoogleConfig {
            drive_root_folder_id: "root".into(),
            sheets_id: "sheet".into(),
            sheets_tab_name: "Lancamentos".into(),
            credentials_json: None,
            credentials_path: "/nonexistent/service_account.json".into(),
            drive_api_base_url: "http://localhost".into(),
            sheets_api_base_url: "http://localhost".into(),
        };
        // Falls through without error; the metadata server is only contacted on use
        assert!(token_source_from_config(&config, reqwest::Client::new())
            .await
            .is_ok());
    }
}
