//! Storage capability traits
//!
//! The pipeline only talks to these traits. Every backend must implement them with
//! find-or-create friendly semantics: `find_folder` never creates, `create_folder`
//! always creates (a concurrent caller may have created a sibling with the same name
//! in between; that race is accepted).

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Folder lookup failed: {0}")]
    LookupFailed(String),

    #[error("Folder creation failed: {0}")]
    CreateFailed(String),

    #[error("Link lookup failed: {0}")]
    LinkFailed(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Spreadsheet read failed: {0}")]
    ReadFailed(String),

    #[error("Spreadsheet write failed: {0}")]
    WriteFailed(String),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Remote document store holding the archive folders.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Id of the first non-trashed folder named exactly `name` directly under
    /// `parent_id`, in the store's own listing order.
    async fn find_folder(&self, name: &str, parent_id: &str) -> StoreResult<Option<String>>;

    /// Create a folder named `name` under `parent_id` and return its id.
    async fn create_folder(&self, name: &str, parent_id: &str) -> StoreResult<String>;

    /// Link a person can open to browse the folder.
    async fn get_shareable_link(&self, folder_id: &str) -> StoreResult<String>;

    /// Upload `content` as a file named `name` into `parent_id` and return the file id.
    async fn upload_file(
        &self,
        parent_id: &str,
        content: Bytes,
        name: &str,
        mime_type: &str,
    ) -> StoreResult<String>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

/// Remote spreadsheet holding the ledger.
///
/// Ranges use A1 notation including the tab name, e.g. `Lancamentos!A1:G1`.
#[async_trait]
pub trait Spreadsheet: Send + Sync {
    /// Rows in `range`; an empty range yields an empty vector.
    async fn read_range(&self, range: &str) -> StoreResult<Vec<Vec<String>>>;

    /// Overwrite the cells of `range` with `rows`, verbatim.
    async fn write_range(&self, range: &str, rows: Vec<Vec<String>>) -> StoreResult<()>;

    /// Insert `row` after the last row of the table found in `range`. Never overwrites.
    async fn append_row(&self, range: &str, row: Vec<String>) -> StoreResult<()>;
}
