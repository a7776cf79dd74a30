use serde::{Deserialize, Serialize};

/// Resolved `root / YYYY-MM / <entry>` location of one ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveLocation {
    pub month_folder_id: String,
    pub entry_folder_id: String,
    pub shareable_link: String,
}

/// Outcome of an ingestion that went past the eligibility guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_location: Option<ArchiveLocation>,
    pub file_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl IngestionResult {
    pub fn succeeded(location: ArchiveLocation, file_count: usize) -> Self {
        Self {
            success: true,
            archive_location: Some(location),
            file_count,
            error_message: None,
        }
    }

    /// `location` is kept when the failure happened after folder resolution, so the
    /// orphaned folder can still be found from the logs.
    pub fn failed(
        error_message: impl Into<String>,
        location: Option<ArchiveLocation>,
        file_count: usize,
    ) -> Self {
        Self {
            success: false,
            archive_location: location,
            file_count,
            error_message: Some(error_message.into()),
        }
    }
}
