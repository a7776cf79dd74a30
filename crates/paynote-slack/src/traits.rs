use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use thiserror::Error;

use crate::payloads::SlackFile;

/// Chat platform errors
#[derive(Debug, Error)]
pub enum SlackError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The Web API answered `ok: false`
    #[error("Slack API {method} failed: {error}")]
    Api { method: String, error: String },

    #[error("File download failed: {0}")]
    Download(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type SlackResult<T> = Result<T, SlackError>;

/// Outbound capabilities of the chat platform.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Fetch an attachment from its authenticated URL.
    async fn download_file(&self, url: &str) -> SlackResult<Bytes>;

    /// React to the message identified by `(channel, ts)` with `emoji` (name without colons).
    async fn add_reaction(&self, channel: &str, ts: &str, emoji: &str) -> SlackResult<()>;

    /// Reply in the thread of the message identified by `(channel, ts)`.
    async fn post_thread_reply(&self, channel: &str, ts: &str, text: &str) -> SlackResult<()>;

    /// Post a top-level message; `text` doubles as the notification fallback when
    /// `blocks` is given.
    async fn post_message(
        &self,
        channel: &str,
        text: &str,
        blocks: Option<Value>,
    ) -> SlackResult<()>;

    /// Open a modal `view` for the interaction identified by `trigger_id`.
    async fn open_modal(&self, trigger_id: &str, view: Value) -> SlackResult<()>;

    /// Metadata (including download URLs) of an uploaded file.
    async fn get_file_info(&self, file_id: &str) -> SlackResult<SlackFile>;
}
