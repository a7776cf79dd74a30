#[cfg(feature = "storage-google")]
use crate::{auth::token_source_from_config, GoogleDriveStore, GoogleSheetsClient};
#[cfg(feature = "storage-local")]
use crate::{LocalDocumentStore, LocalSpreadsheet};
use crate::{DocumentStore, Spreadsheet, StorageBackend, StoreError, StoreResult};
use paynote_core::Config;
use std::sync::Arc;

/// The two storage capabilities an ingestion needs, plus where they are rooted.
#[derive(Clone)]
pub struct Backends {
    pub documents: Arc<dyn DocumentStore>,
    pub ledger: Arc<dyn Spreadsheet>,
    /// Parent of every month folder
    pub root_folder_id: String,
    /// Ledger tab name
    pub sheet_tab: String,
}

/// Create the storage backends selected by configuration
pub async fn create_backends(config: &Config) -> StoreResult<Backends> {
    match config.storage_backend {
        #[cfg(feature = "storage-google")]
        StorageBackend::Google => {
            let http_client = reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(config.http_timeout_secs()))
                .build()
                .map_err(|e| {
                    StoreError::ConfigError(format!("Failed to build HTTP client: {}", e))
                })?;

            let google = &config.google;
            if google.drive_root_folder_id.is_empty() {
                return Err(StoreError::ConfigError(
                    "GOOGLE_DRIVE_FOLDER_ID not configured".to_string(),
                ));
            }
            if google.sheets_id.is_empty() {
                return Err(StoreError::ConfigError(
                    "GOOGLE_SHEETS_ID not configured".to_string(),
                ));
            }

            let tokens = token_source_from_config(google, http_client.clone()).await?;
            let documents = GoogleDriveStore::new(
                http_client.clone(),
                tokens.clone(),
                google.drive_api_base_url.clone(),
            );
            let ledger = GoogleSheetsClient::new(
                http_client,
                tokens,
                google.sheets_api_base_url.clone(),
                google.sheets_id.clone(),
            );

            Ok(Backends {
                documents: Arc::new(documents),
                ledger: Arc::new(ledger),
                root_folder_id: google.drive_root_folder_id.clone(),
                sheet_tab: google.sheets_tab_name.clone(),
            })
        }

        #[cfg(not(feature = "storage-google"))]
        StorageBackend::Google => Err(StoreError::ConfigError(
            "Google storage backend not available (storage-google feature not enabled)"
                .to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let local = config.local.as_ref().ok_or_else(|| {
                StoreError::ConfigError(
                    "LOCAL_STORAGE_PATH and LOCAL_STORAGE_BASE_URL not configured".to_string(),
                )
            })?;

            let base_path = std::path::PathBuf::from(&local.path);
            let documents =
                LocalDocumentStore::new(base_path.join("archive"), local.base_url.clone()).await?;
            let ledger = LocalSpreadsheet::new(base_path.join("ledger")).await?;

            Ok(Backends {
                documents: Arc::new(documents),
                ledger: Arc::new(ledger),
                root_folder_id: String::new(),
                sheet_tab: config.google.sheets_tab_name.clone(),
            })
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StoreError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_create_local_backends() {
        let dir = tempfile::TempDir::new().unwrap();
        let vars: HashMap<&str, String> = [
            ("SLACK_BOT_TOKEN", "xoxb-test".to_string()),
            ("STORAGE_BACKEND", "local".to_string()),
            ("LOCAL_STORAGE_PATH", dir.path().display().to_string()),
            ("LOCAL_STORAGE_BASE_URL", "http://localhost:8080/archive".to_string()),
        ]
        .into_iter()
        .collect();
        let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();

        let backends = create_backends(&config).await.unwrap();
        assert_eq!(backends.documents.backend_type(), StorageBackend::Local);
        assert_eq!(backends.root_folder_id, "");
        assert_eq!(backends.sheet_tab, "Lancamentos");
        assert!(dir.path().join("archive").is_dir());
        assert!(dir.path().join("ledger").is_dir());
    }

    #[tokio::test]
    async fn test_local_backend_without_path_fails() {
        let vars: HashMap<&str, String> = [
            ("SLACK_BOT_TOKEN", "xoxb-test".to_string()),
            ("STORAGE_BACKEND", "local".to_string()),
        ]
        .into_iter()
        .collect();
        let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();

        assert!(matches!(
            create_backends(&config).await,
            Err(StoreError::ConfigError(_))
        ));
    }
}
