//! Slack request signature verification
//!
//! Slack signs every request with `X-Slack-Signature: v0=<hex>` where `<hex>` is
//! HMAC-SHA256 over `v0:{X-Slack-Request-Timestamp}:{raw body}` keyed with the app's
//! signing secret. Requests older than the configured window are rejected.

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::error::ErrorResponse;

pub const SIGNATURE_HEADER: &str = "X-Slack-Signature";
pub const TIMESTAMP_HEADER: &str = "X-Slack-Request-Timestamp";
const VERSION: &str = "v0";

/// Slack payloads are small; anything larger is not from Slack
const MAX_BODY_BYTES: usize = 1024 * 1024;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing signature headers")]
    MissingHeaders,

    #[error("invalid request timestamp")]
    InvalidTimestamp,

    #[error("request timestamp outside the allowed window")]
    Expired,

    #[error("signature mismatch")]
    Mismatch,

    #[error("request body could not be read")]
    UnreadableBody,
}

/// Verifies inbound Slack signatures. Without a signing secret every request passes.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    signing_secret: Option<String>,
    max_age_secs: u64,
}

impl SignatureVerifier {
    pub fn new(signing_secret: Option<String>, max_age_secs: u64) -> Self {
        if signing_secret.is_none() {
            tracing::warn!("SLACK_SIGNING_SECRET not configured, request signatures will not be verified");
        }
        Self {
            signing_secret,
            max_age_secs,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.signing_secret.is_some()
    }

    /// `v0=<hex hmac>` for `body` sent at `timestamp`.
    pub fn sign(secret: &str, timestamp: &str, body: &[u8]) -> String {
        // HMAC accepts keys of any length
        let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
            Ok(mac) => mac,
            Err(_) => return String::new(),
        };
        mac.update(format!("{}:{}:", VERSION, timestamp).as_bytes());
        mac.update(body);
        format!("{}={}", VERSION, hex::encode(mac.finalize().into_bytes()))
    }

    /// Check the headers of a request against its raw body, `now` in Unix seconds.
    pub fn verify(
        &self,
        timestamp: Option<&str>,
        signature: Option<&str>,
        body: &[u8],
        now: u64,
    ) -> Result<(), SignatureError> {
        let Some(secret) = &self.signing_secret else {
            return Ok(());
        };

        let (Some(timestamp), Some(signature)) = (timestamp, signature) else {
            return Err(SignatureError::MissingHeaders);
        };

        let sent_at: u64 = timestamp
            .trim()
            .parse()
            .map_err(|_| SignatureError::InvalidTimestamp)?;
        if now.abs_diff(sent_at) > self.max_age_secs {
            return Err(SignatureError::Expired);
        }

        let expected = Self::sign(secret, timestamp.trim(), body);
        if expected.as_bytes().ct_eq(signature.trim().as_bytes()).into() {
            Ok(())
        } else {
            Err(SignatureError::Mismatch)
        }
    }
}

fn header<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
    request.headers().get(name).and_then(|h| h.to_str().ok())
}

fn unauthorized(error: SignatureError) -> Response {
    tracing::warn!(error = %error, "Rejected Slack request");
    (
        StatusCode::UNAUTHORIZED,
        Json(
            ErrorResponse::new("Invalid request signature")
                .with_type("SignatureVerificationError")
                .with_details(error.to_string()),
        ),
    )
        .into_response()
}

/// Signature middleware for the Slack routes.
///
/// The body is buffered to compute the HMAC and handed on unchanged.
pub async fn slack_signature_middleware(
    State(verifier): State<Arc<SignatureVerifier>>,
    request: Request,
    next: Next,
) -> Response {
    if !verifier.is_enabled() {
        tracing::debug!("Signature verification disabled");
        return next.run(request).await;
    }

    let timestamp = header(&request, TIMESTAMP_HEADER).map(String::from);
    let signature = header(&request, SIGNATURE_HEADER).map(String::from);

    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(_) => return unauthorized(SignatureError::UnreadableBody),
    };

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();

    if let Err(e) = verifier.verify(timestamp.as_deref(), signature.as_deref(), &bytes, now) {
        return unauthorized(e);
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}
