//! Paynote HTTP service
//!
//! Slack webhooks (events, slash commands, interactivity) feeding the ingestion
//! pipeline, plus a health check.

pub mod constants;
pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;

pub use error::{HttpAppError, ValidatedForm};
pub use state::AppState;
