//! Paynote Core Library
//!
//! This crate provides the domain models, error types, configuration and constants
//! shared by every Paynote component.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{Config, GoogleConfig, LocalStorageConfig, SlackConfig};
pub use error::{AppError, ErrorMetadata};
pub use models::{
    ArchiveLocation, Attachment, AttachmentRef, IngestionResult, PaymentRecord, StructuredForm,
    SurfaceContext,
};
pub use storage_types::StorageBackend;
