//! Folder resolution and attachment upload for one ingestion.

pub mod archiver;
pub mod resolver;

pub use archiver::AttachmentArchiver;
pub use resolver::ArchiveResolver;
