//! Events API endpoint

use crate::constants::SLACK_RETRY_HEADER;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use paynote_services::IngestionOutcome;
use paynote_slack::EventEnvelope;
use serde_json::json;
use std::sync::Arc;

fn ack() -> Response {
    Json(json!({ "ok": true })).into_response()
}

/// Handles `url_verification` and `event_callback` envelopes.
///
/// Message events are ingested before answering. Everything else is acknowledged with
/// a 200, unreadable bodies included: Slack redelivers on any other status.
/// Redeliveries are acknowledged without being processed again.
pub async fn slack_events(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let envelope: EventEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!(error = %e, "Unreadable event body, acknowledging");
            return ack();
        }
    };

    match envelope {
        EventEnvelope::UrlVerification { challenge } => {
            tracing::info!("Answering URL verification");
            Json(json!({ "challenge": challenge })).into_response()
        }
        EventEnvelope::EventCallback { event_id, event } => {
            let event_id = event_id.unwrap_or_default();

            if let Some(retry) = headers.get(SLACK_RETRY_HEADER) {
                tracing::info!(event_id = %event_id, retry = ?retry, "Ignoring redelivered event");
                return ack();
            }

            let message = match EventEnvelope::message_event(&event) {
                Ok(message) => message,
                Err(e) => {
                    tracing::warn!(
                        event_id = %event_id,
                        event_type = event["type"].as_str().unwrap_or_default(),
                        error = %e,
                        "Event is not a message, acknowledging"
                    );
                    return ack();
                }
            };

            match state.ingestion.ingest_message(&message).await {
                IngestionOutcome::Completed(result) => tracing::info!(
                    event_id = %event_id,
                    success = result.success,
                    file_count = result.file_count,
                    "Message ingested"
                ),
                IngestionOutcome::Dropped(reason) => tracing::debug!(
                    event_id = %event_id,
                    reason = ?reason,
                    "Message not ingested"
                ),
            }
            ack()
        }
        EventEnvelope::Other => ack(),
    }
}
