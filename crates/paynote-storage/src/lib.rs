//! Paynote Storage Library
//!
//! Capability traits for the two remote systems an ingestion writes to, and their
//! implementations:
//!
//! - [`DocumentStore`]: folder find/create, shareable links and file uploads
//!   (Google Drive, or local directories)
//! - [`Spreadsheet`]: range read/write and row append (Google Sheets, or a local
//!   tab-separated file)
//!
//! # Folder ids
//!
//! Ids are opaque to callers. Drive returns its own file ids; the local backend uses the
//! folder path relative to the storage root, with the root itself being the empty id.

#[cfg(feature = "storage-google")]
pub mod auth;
#[cfg(feature = "storage-google")]
pub mod drive;
pub mod factory;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod range;
#[cfg(feature = "storage-google")]
pub mod sheets;
pub mod traits;

// Re-export commonly used types
#[cfg(feature = "storage-google")]
pub use auth::{StaticTokenSource, TokenSource};
#[cfg(feature = "storage-google")]
pub use drive::GoogleDriveStore;
pub use factory::{create_backends, Backends};
#[cfg(feature = "storage-local")]
pub use local::{LocalDocumentStore, LocalSpreadsheet};
pub use paynote_core::StorageBackend;
pub use range::SheetRange;
#[cfg(feature = "storage-google")]
pub use sheets::GoogleSheetsClient;
pub use traits::{DocumentStore, Spreadsheet, StoreError, StoreResult};
