//! Slash command endpoint

use crate::error::{HttpAppError, ValidatedForm};
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use paynote_slack::{blocks, SlashCommand};
use serde_json::json;
use std::sync::Arc;

fn ephemeral(text: String) -> Response {
    Json(json!({ "response_type": "ephemeral", "text": text })).into_response()
}

/// Opens the payment modal for the configured command.
///
/// The trigger id expires after three seconds, so the modal is opened before answering.
/// The channel the command came from travels in the modal's `private_metadata`.
pub async fn slash_command(
    State(state): State<Arc<AppState>>,
    ValidatedForm(command): ValidatedForm<SlashCommand>,
) -> Result<Response, HttpAppError> {
    if command.command != state.slash_command {
        tracing::debug!(command = %command.command, "Unknown slash command");
        return Ok(ephemeral(format!("Comando desconhecido: {}", command.command)));
    }

    let view = blocks::payment_modal(&command.channel_id);
    match state.chat.open_modal(&command.trigger_id, view).await {
        Ok(()) => {
            tracing::info!(
                channel = %command.channel_id,
                user = %command.user_id,
                "Payment modal opened"
            );
            Ok(StatusCode::OK.into_response())
        }
        Err(e) => {
            tracing::error!(
                error = %e,
                channel = %command.channel_id,
                "Failed to open payment modal"
            );
            Ok(ephemeral(format!(
                "Nao foi possivel abrir o formulario: {}",
                e
            )))
        }
    }
}
