//! Backend construction and application state setup

use crate::state::AppState;
use anyhow::{Context, Result};
use paynote_core::Config;
use paynote_services::{IngestionService, IngestionSettings};
use paynote_slack::{ChatPlatform, SlackClient};
use paynote_storage::create_backends;
use std::sync::Arc;
use tokio_util::task::TaskTracker;

/// Build the storage backends, the Slack client and the ingestion service
pub async fn initialize_services(config: &Config) -> Result<Arc<AppState>> {
    let backends = create_backends(config)
        .await
        .context("Failed to initialize storage backends")?;
    tracing::info!(
        backend = %backends.documents.backend_type(),
        root_folder_id = %backends.root_folder_id,
        sheet_tab = %backends.sheet_tab,
        "Storage backends initialized"
    );

    let chat: Arc<dyn ChatPlatform> = Arc::new(
        SlackClient::from_config(&config.slack, config.http_timeout_secs())
            .context("Failed to create Slack client")?,
    );

    let settings = IngestionSettings {
        root_folder_id: backends.root_folder_id,
        sheet_tab: backends.sheet_tab,
        timezone: config.timezone(),
        channel_filter: config.slack.channel_filter.clone(),
    };
    let ingestion = IngestionService::new(backends.documents, backends.ledger, chat.clone(), settings);

    // A missing header is also written on the first ingestion
    match ingestion.ledger().ensure_header().await {
        Ok(true) => tracing::info!("Ledger header written"),
        Ok(false) => tracing::debug!("Ledger header present"),
        Err(e) => tracing::warn!(error = %e, "Could not check the ledger header at startup"),
    }

    Ok(Arc::new(AppState {
        ingestion: Arc::new(ingestion),
        chat,
        slash_command: config.slack.command.clone(),
        background: TaskTracker::new(),
        expose_error_details: !config.is_production(),
    }))
}
