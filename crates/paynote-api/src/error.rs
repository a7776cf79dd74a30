//! HTTP error response conversion
//!
//! Handlers return `Result<_, HttpAppError>`. Only undecodable request bodies end up
//! here; pipeline outcomes are reported in Slack and the webhook is acknowledged
//! regardless.

use crate::state::AppState;
use axum::{
    extract::rejection::FormRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Form, Json,
};
use paynote_core::{AppError, ErrorMetadata};
use paynote_infra::ErrorResponse;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Wrapper so `IntoResponse` can be implemented for the core error type.
///
/// Whether the underlying error text is echoed to the caller is decided from the
/// configuration when the error is built, see [`AppState::expose_error_details`].
#[derive(Debug)]
pub struct HttpAppError {
    error: AppError,
    expose_details: bool,
}

impl HttpAppError {
    pub fn new(error: AppError, expose_details: bool) -> Self {
        Self {
            error,
            expose_details,
        }
    }

    pub fn error(&self) -> &AppError {
        &self.error
    }
}

fn form_rejection(rejection: FormRejection) -> AppError {
    AppError::InvalidInput(format!("Invalid form body: {}", rejection.body_text()))
}

/// Form body extractor that answers with our `ErrorResponse` shape on failure.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedForm<T>(pub T);

impl<T> FromRequest<Arc<AppState>> for ValidatedForm<T>
where
    T: DeserializeOwned + Send,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let Form(inner) = Form::<T>::from_request(req, state)
            .await
            .map_err(|r| HttpAppError::new(form_rejection(r), state.expose_error_details))?;
        Ok(ValidatedForm(inner))
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.error.http_status_code())
            .unwrap_or(StatusCode::BAD_REQUEST);

        tracing::debug!(error = %self.error, code = self.error.error_code(), "Request rejected");

        let mut body = ErrorResponse::new(self.error.client_message())
            .with_type(self.error.error_code());
        if self.expose_details {
            body = body.with_details(self.error.to_string());
        }

        (status, Json(body)).into_response()
    }
}
