use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// An attachment as announced by the chat platform, before its bytes are fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    /// Platform file id
    pub source_id: String,
    pub display_name: String,
    pub mime_type: String,
    /// Authenticated download URL. Missing for some modal uploads, which are resolved
    /// through the platform's file info lookup.
    pub download_url: Option<String>,
}

/// A downloaded attachment. Lives only for the duration of one ingestion.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub source_id: String,
    pub display_name: String,
    pub mime_type: String,
    pub content: Bytes,
}
