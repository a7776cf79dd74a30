//! Interactivity endpoint

use crate::error::{HttpAppError, ValidatedForm};
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use paynote_services::IngestionOutcome;
use paynote_slack::InteractionPayload;
use serde::Deserialize;
use std::sync::Arc;
use tracing::Instrument;

/// Interactivity requests are form encoded with the JSON in `payload`
#[derive(Debug, Deserialize)]
pub struct InteractionForm {
    pub payload: String,
}

/// Accepts view submissions.
///
/// Slack closes the modal on an empty 200 and gives up after three seconds, so the
/// ingestion runs on a background task and reports its outcome in the channel. The
/// task is tracked so shutdown waits for it.
pub async fn interactions(
    State(state): State<Arc<AppState>>,
    ValidatedForm(form): ValidatedForm<InteractionForm>,
) -> Result<Response, HttpAppError> {
    let payload: InteractionPayload = serde_json::from_str(&form.payload)
        .map_err(|e| HttpAppError::new(e.into(), state.expose_error_details))?;

    let InteractionPayload::ViewSubmission(submission) = payload else {
        tracing::debug!("Ignoring interaction");
        return Ok(StatusCode::OK.into_response());
    };

    let ingestion = state.ingestion.clone();
    let span = tracing::info_span!(
        "view_submission",
        callback_id = %submission.view.callback_id,
        user = %submission.user_id()
    );
    state.background.spawn(
        async move {
            match ingestion.ingest_submission(&submission).await {
                IngestionOutcome::Completed(result) => tracing::info!(
                    success = result.success,
                    file_count = result.file_count,
                    "Submission ingested"
                ),
                IngestionOutcome::Dropped(reason) => {
                    tracing::debug!(reason = ?reason, "Submission not ingested")
                }
            }
        }
        .instrument(span),
    );

    Ok(StatusCode::OK.into_response())
}
