use serde::{Deserialize, Serialize};

/// Identifies where an ingestion came from and where its outcome is reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "surface", rename_all = "snake_case")]
pub enum SurfaceContext {
    /// A channel message; replies go to its thread.
    Message { channel: String, ts: String },
    /// A modal submission; the summary goes to the channel the modal was opened from.
    Modal { channel: String, user_id: String },
}

impl SurfaceContext {
    pub fn channel(&self) -> &str {
        match self {
            SurfaceContext::Message { channel, .. } | SurfaceContext::Modal { channel, .. } => {
                channel
            }
        }
    }
}
