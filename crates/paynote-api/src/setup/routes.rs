//! Route configuration and setup

use crate::constants::{HTTP_CONCURRENCY_LIMIT, MAX_REQUEST_BODY_BYTES};
use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use paynote_core::Config;
use paynote_infra::{request_id_middleware, slack_signature_middleware, SignatureVerifier};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Router {
    let verifier = Arc::new(SignatureVerifier::new(
        config.slack.signing_secret.clone(),
        config.slack.signature_max_age_secs,
    ));
    build_router(state, verifier)
}

/// Health routes plus the Slack webhooks behind signature verification
pub fn build_router(state: Arc<AppState>, verifier: Arc<SignatureVerifier>) -> Router {
    let slack_routes = Router::new()
        .route("/events", post(handlers::events::slack_events))
        .route("/commands", post(handlers::commands::slash_command))
        .route("/interactions", post(handlers::interactions::interactions))
        .layer(axum::middleware::from_fn_with_state(
            verifier,
            slack_signature_middleware,
        ));

    Router::new()
        .route("/", get(handlers::health::health_check))
        .route("/health", get(handlers::health::health_check))
        .nest("/slack", slack_routes)
        .layer(ConcurrencyLimitLayer::new(HTTP_CONCURRENCY_LIMIT))
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state)
}
