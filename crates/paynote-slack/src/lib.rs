//! Slack integration for Paynote.
//!
//! - [`ChatPlatform`]: the outbound capabilities the pipeline needs (file download,
//!   reactions, replies, channel messages, modals, file info)
//! - [`SlackClient`]: the Web API implementation of it
//! - [`payloads`]: inbound events, slash commands and interactions
//! - [`blocks`]: Block Kit views and messages

pub mod blocks;
pub mod client;
pub mod payloads;
pub mod traits;

pub use client::SlackClient;
pub use payloads::{
    EventEnvelope, InteractionPayload, MessageEvent, SlackFile, SlackUser, SlashCommand, View,
    ViewState, ViewSubmission,
};
pub use traits::{ChatPlatform, SlackError, SlackResult};
