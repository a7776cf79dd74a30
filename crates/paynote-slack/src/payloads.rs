//! Inbound Slack payloads
//!
//! Only the fields the pipeline reads are modeled; everything else is ignored on
//! deserialization.

use paynote_core::constants::{DEFAULT_ATTACHMENT_NAME, DEFAULT_MIME_TYPE};
use paynote_core::{AttachmentRef, StructuredForm};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashMap;

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of a request to the Events API endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventEnvelope {
    UrlVerification {
        challenge: String,
    },
    EventCallback {
        #[serde(default)]
        event_id: Option<String>,
        /// Kept raw: the Events API delivers many event shapes on one endpoint and only
        /// messages are mapped, see [`EventEnvelope::message_event`].
        #[serde(default)]
        event: Value,
    },
    #[serde(other)]
    Other,
}

impl EventEnvelope {
    /// The inner event of an `event_callback` when it has the shape of a message.
    pub fn message_event(event: &Value) -> Result<MessageEvent, serde_json::Error> {
        MessageEvent::deserialize(event)
    }
}

/// A message event. Other event types that happen to share its shape deserialize too
/// and are filtered by [`MessageEvent::is_processable`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageEvent {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub event_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub channel: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ts: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub files: Vec<SlackFile>,
    #[serde(default)]
    pub bot_id: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>,
}

impl MessageEvent {
    /// A plain user message, or a user message carrying files.
    pub fn is_processable(&self) -> bool {
        self.event_type == "message"
            && self.bot_id.is_none()
            && matches!(self.subtype.as_deref(), None | Some("file_share"))
    }

    pub fn attachment_refs(&self) -> Vec<AttachmentRef> {
        self.files.iter().map(SlackFile::to_attachment_ref).collect()
    }
}

/// A file shared in a message or through a file input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SlackFile {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mimetype: Option<String>,
    #[serde(default)]
    pub url_private_download: Option<String>,
    #[serde(default)]
    pub url_private: Option<String>,
}

impl SlackFile {
    /// `url_private_download`, else `url_private`.
    pub fn download_url(&self) -> Option<&str> {
        self.url_private_download
            .as_deref()
            .or(self.url_private.as_deref())
            .filter(|url| !url.is_empty())
    }

    pub fn to_attachment_ref(&self) -> AttachmentRef {
        AttachmentRef {
            source_id: self.id.clone(),
            display_name: self
                .name
                .clone()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| DEFAULT_ATTACHMENT_NAME.to_string()),
            mime_type: self
                .mimetype
                .clone()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string()),
            download_url: self.download_url().map(String::from),
        }
    }
}

/// Slash command request (form encoded).
#[derive(Debug, Clone, Deserialize)]
pub struct SlashCommand {
    pub command: String,
    pub trigger_id: String,
    pub user_id: String,
    pub channel_id: String,
    #[serde(default)]
    pub text: String,
}

/// Decoded `payload` field of an interactivity request.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InteractionPayload {
    ViewSubmission(ViewSubmission),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewSubmission {
    pub view: View,
    pub user: SlackUser,
}

impl ViewSubmission {
    /// Channel the modal was opened from, carried in `private_metadata`.
    pub fn channel_id(&self) -> &str {
        &self.view.private_metadata
    }

    pub fn user_id(&self) -> &str {
        &self.user.id
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlackUser {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct View {
    #[serde(default)]
    pub callback_id: String,
    #[serde(default)]
    pub private_metadata: String,
    #[serde(default)]
    pub state: ViewState,
}

/// `view.state.values`: block id -> action id -> element state.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewState {
    #[serde(default)]
    pub values: HashMap<String, HashMap<String, ElementState>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ElementState {
    #[serde(rename = "type", default)]
    pub element_type: String,
    /// Plain text inputs
    #[serde(default)]
    pub value: Option<String>,
    /// Date pickers, `YYYY-MM-DD`
    #[serde(default)]
    pub selected_date: Option<String>,
    /// File inputs
    #[serde(default)]
    pub files: Option<Vec<SlackFile>>,
}

impl ViewState {
    /// Text values keyed by action id. Blank inputs are omitted.
    pub fn to_form(&self) -> StructuredForm {
        self.values
            .values()
            .flat_map(|actions| actions.iter())
            .filter_map(|(action_id, state)| {
                state
                    .value
                    .as_deref()
                    .or(state.selected_date.as_deref())
                    .map(|value| (action_id.clone(), value.to_string()))
            })
            .collect()
    }

    /// Files of every file input, each input's files in upload order.
    pub fn files(&self) -> Vec<SlackFile> {
        self.values
            .values()
            .flat_map(|actions| actions.values())
            .filter_map(|state| state.files.clone())
            .flatten()
            .collect()
    }
}
