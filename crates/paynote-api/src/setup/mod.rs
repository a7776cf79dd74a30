//! Application setup and initialization

pub mod routes;
pub mod server;
pub mod services;

use crate::state::AppState;
use anyhow::{Context, Result};
use paynote_core::Config;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    paynote_infra::init_telemetry(config.json_logs())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    // Fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    tracing::info!(
        environment = %config.environment(),
        backend = %config.storage_backend,
        timezone = %config.timezone(),
        "Configuration loaded and validated successfully"
    );

    let state = services::initialize_services(&config).await?;

    let router = routes::setup_routes(&config, state.clone());

    Ok((state, router))
}
