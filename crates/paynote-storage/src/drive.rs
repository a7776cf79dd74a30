//! Google Drive document store (Drive API v3)
//!
//! Every call passes `supportsAllDrives=true` so the root folder may live in a shared
//! drive. Uploads use the resumable protocol: one request for metadata, one for bytes.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::auth::TokenSource;
use crate::traits::{DocumentStore, StoreError, StoreResult};
use crate::StorageBackend;

const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<FileId>,
}

#[derive(Debug, Deserialize)]
struct FileId {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileLink {
    #[serde(default)]
    web_view_link: Option<String>,
}

/// Google Drive storage implementation
#[derive(Clone)]
pub struct GoogleDriveStore {
    http_client: reqwest::Client,
    tokens: Arc<dyn TokenSource>,
    base_url: String,
}

impl GoogleDriveStore {
    /// # Arguments
    /// * `base_url` - API origin, `https://www.googleapis.com` in production
    pub fn new(http_client: reqwest::Client, tokens: Arc<dyn TokenSource>, base_url: String) -> Self {
        Self {
            http_client,
            tokens,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn files_url(&self) -> String {
        format!("{}/drive/v3/files", self.base_url)
    }

    /// Drive query for a non-trashed folder with an exact name under an exact parent.
    fn folder_query(name: &str, parent_id: &str) -> String {
        format!(
            "name = '{}' and '{}' in parents and mimeType = '{}' and trashed = false",
            escape_query_literal(name),
            escape_query_literal(parent_id),
            FOLDER_MIME_TYPE
        )
    }

    async fn token(&self) -> StoreResult<String> {
        self.tokens.access_token().await
    }
}

/// Escape a value for a single-quoted Drive query literal.
fn escape_query_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Turn a non-2xx response into an error built by `make_error`.
async fn ensure_success(
    response: reqwest::Response,
    make_error: fn(String) -> StoreError,
) -> StoreResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(make_error(format!(
        "Drive API returned {}: {}",
        status, error_text
    )))
}

#[async_trait]
impl DocumentStore for GoogleDriveStore {
    #[tracing::instrument(skip(self))]
    async fn find_folder(&self, name: &str, parent_id: &str) -> StoreResult<Option<String>> {
        let token = self.token().await?;
        let response = self
            .http_client
            .get(self.files_url())
            .bearer_auth(token)
            .query(&[
                ("q", Self::folder_query(name, parent_id).as_str()),
                ("fields", "files(id)"),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ])
            .send()
            .await
            .map_err(|e| StoreError::LookupFailed(e.to_string()))?;

        let list: FileList = ensure_success(response, StoreError::LookupFailed)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::LookupFailed(format!("Invalid file list: {}", e)))?;

        Ok(list.files.into_iter().next().map(|f| f.id))
    }

    #[tracing::instrument(skip(self))]
    async fn create_folder(&self, name: &str, parent_id: &str) -> StoreResult<String> {
        let token = self.token().await?;
        let response = self
            .http_client
            .post(self.files_url())
            .bearer_auth(token)
            .query(&[("supportsAllDrives", "true"), ("fields", "id")])
            .json(&json!({
                "name": name,
                "mimeType": FOLDER_MIME_TYPE,
                "parents": [parent_id],
            }))
            .send()
            .await
            .map_err(|e| StoreError::CreateFailed(e.to_string()))?;

        let created: FileId = ensure_success(response, StoreError::CreateFailed)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::CreateFailed(format!("Invalid create response: {}", e)))?;

        tracing::info!(folder_name = %name, folder_id = %created.id, "Folder created");
        Ok(created.id)
    }

    #[tracing::instrument(skip(self))]
    async fn get_shareable_link(&self, folder_id: &str) -> StoreResult<String> {
        let token = self.token().await?;
        let response = self
            .http_client
            .get(format!("{}/{}", self.files_url(), folder_id))
            .bearer_auth(token)
            .query(&[("fields", "webViewLink"), ("supportsAllDrives", "true")])
            .send()
            .await
            .map_err(|e| StoreError::LinkFailed(e.to_string()))?;

        let link: FileLink = ensure_success(response, StoreError::LinkFailed)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::LinkFailed(format!("Invalid file metadata: {}", e)))?;

        Ok(link.web_view_link.unwrap_or_default())
    }

    #[tracing::instrument(skip(self, content), fields(size = content.len()))]
    async fn upload_file(
        &self,
        parent_id: &str,
        content: Bytes,
        name: &str,
        mime_type: &str,
    ) -> StoreResult<String> {
        let token = self.token().await?;

        // Start a resumable session
        let response = self
            .http_client
            .post(format!("{}/upload/drive/v3/files", self.base_url))
            .bearer_auth(&token)
            .query(&[
                ("uploadType", "resumable"),
                ("supportsAllDrives", "true"),
                ("fields", "id"),
            ])
            .header("X-Upload-Content-Type", mime_type)
            .header("X-Upload-Content-Length", content.len().to_string())
            .json(&json!({
                "name": name,
                "parents": [parent_id],
                "mimeType": mime_type,
            }))
            .send()
            .await
            .map_err(|e| StoreError::UploadFailed(e.to_string()))?;

        let response = ensure_success(response, StoreError::UploadFailed).await?;
        let session_url = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|h| h.to_str().ok())
            .map(String::from)
            .ok_or_else(|| {
                StoreError::UploadFailed("Resumable session has no Location header".to_string())
            })?;

        // Send the bytes in one request
        let response = self
            .http_client
            .put(&session_url)
            .bearer_auth(&token)
            .header(reqwest::header::CONTENT_TYPE, mime_type)
            .body(content)
            .send()
            .await
            .map_err(|e| StoreError::UploadFailed(e.to_string()))?;

        let uploaded: FileId = ensure_success(response, StoreError::UploadFailed)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::UploadFailed(format!("Invalid upload response: {}", e)))?;

        tracing::info!(file_name = %name, file_id = %uploaded.id, "File uploaded");
        Ok(uploaded.id)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Google
    }
}
