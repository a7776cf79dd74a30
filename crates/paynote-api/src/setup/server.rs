//! Server startup and graceful shutdown

use anyhow::Result;
use axum::Router;
use paynote_core::Config;
use tokio_util::task::TaskTracker;

/// Start the server with graceful shutdown.
///
/// Once the listener stops, ingestions still running in `background` are awaited.
pub async fn start_server(config: &Config, app: Router, background: TaskTracker) -> Result<()> {
    let addr = format!("0.0.0.0:{}", config.server_port());
    tracing::info!(addr = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        slash_command = %config.slack.command,
        channel_filter = config.slack.channel_filter.as_deref().unwrap_or("*"),
        signature_verification = config.slack.signing_secret.is_some(),
        "Server ready and accepting connections"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    drain_background_tasks(&background).await;
    paynote_infra::shutdown_telemetry().await;

    Ok(())
}

/// Stop accepting background work and wait for what is already running.
pub async fn drain_background_tasks(background: &TaskTracker) {
    background.close();
    if !background.is_empty() {
        tracing::info!(pending = background.len(), "Waiting for background ingestions");
    }
    background.wait().await;
    tracing::debug!("Background ingestions finished");
}

/// Resolves on Ctrl+C (SIGINT) or SIGTERM.
///
/// # Panics
/// Panics if a signal handler cannot be installed.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
    }

    tracing::info!("Shutting down gracefully...");
}
