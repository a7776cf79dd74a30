//! Outcome reporting back to the surface an ingestion came from.
//!
//! Nothing here returns an error: a notification that cannot be delivered is logged and
//! the ingestion's outcome stands.

use paynote_core::constants::{REACTION_FAILURE, REACTION_SUCCESS};
use paynote_core::{ArchiveLocation, PaymentRecord, SurfaceContext};
use paynote_slack::{blocks, ChatPlatform, SlackResult};
use std::sync::Arc;

/// Thread reply for a successful message ingestion.
pub fn success_text(link: &str, file_count: usize) -> String {
    let files = if file_count > 0 {
        format!("{} arquivo(s) salvos", file_count)
    } else {
        "Nenhum comprovante anexado".to_string()
    };
    format!("*Lancamento registrado!*\nPasta: {}\n{}", link, files)
}

pub fn failure_text(error: &str) -> String {
    format!("Erro ao processar lancamento: {}", error)
}

#[derive(Clone)]
pub struct NotificationDispatcher {
    chat: Arc<dyn ChatPlatform>,
}

impl NotificationDispatcher {
    pub fn new(chat: Arc<dyn ChatPlatform>) -> Self {
        Self { chat }
    }

    #[tracing::instrument(skip_all, fields(channel = %context.channel()))]
    pub async fn notify_success(
        &self,
        context: &SurfaceContext,
        record: &PaymentRecord,
        location: &ArchiveLocation,
        file_count: usize,
    ) {
        match context {
            SurfaceContext::Message { channel, ts } => {
                log_failure(
                    "reaction",
                    self.chat.add_reaction(channel, ts, REACTION_SUCCESS).await,
                );
                log_failure(
                    "thread reply",
                    self.chat
                        .post_thread_reply(
                            channel,
                            ts,
                            &success_text(&location.shareable_link, file_count),
                        )
                        .await,
                );
            }
            SurfaceContext::Modal { channel, user_id } => {
                let summary = blocks::submission_summary(
                    user_id,
                    record,
                    file_count,
                    &location.shareable_link,
                );
                log_failure(
                    "summary message",
                    self.chat
                        .post_message(
                            channel,
                            &success_text(&location.shareable_link, file_count),
                            Some(summary),
                        )
                        .await,
                );
            }
        }
    }

    #[tracing::instrument(skip_all, fields(channel = %context.channel()))]
    pub async fn notify_failure(&self, context: &SurfaceContext, error: &str) {
        match context {
            SurfaceContext::Message { channel, ts } => {
                log_failure(
                    "reaction",
                    self.chat.add_reaction(channel, ts, REACTION_FAILURE).await,
                );
                log_failure(
                    "thread reply",
                    self.chat
                        .post_thread_reply(channel, ts, &failure_text(error))
                        .await,
                );
            }
            SurfaceContext::Modal { channel, user_id } => {
                let text = format!("<@{}> {}", user_id, failure_text(error));
                log_failure(
                    "failure message",
                    self.chat.post_message(channel, &text, None).await,
                );
            }
        }
    }
}

fn log_failure(what: &str, result: SlackResult<()>) {
    if let Err(e) = result {
        tracing::warn!(notification = %what, error = %e, "Failed to deliver notification");
    }
}
