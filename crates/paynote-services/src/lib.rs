//! Paynote Services Layer
//!
//! The ingestion pipeline: field extraction, folder naming, archive resolution,
//! attachment archiving, the ledger, notifications, and the service that sequences
//! them. Transports live elsewhere; this crate only talks to the storage and chat
//! capability traits.

pub mod archive;
pub mod extraction;
pub mod ingestion;
pub mod ledger;
pub mod naming;
pub mod notify;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use archive::{ArchiveResolver, AttachmentArchiver};
pub use extraction::{extract, extract_from_structured, is_eligible};
pub use ingestion::{
    DropReason, IngestionError, IngestionOutcome, IngestionService, IngestionSettings, Stage,
};
pub use ledger::LedgerWriter;
pub use naming::FolderNamer;
pub use notify::NotificationDispatcher;
