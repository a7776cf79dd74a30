//! Paynote CLI: try the extractor offline and check backend access.
//!
//! `check` reads the same environment (and `.env`) as the service.

use anyhow::Context;
use chrono::Utc;
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use paynote_cli::{init_tracing, parse_report};
use paynote_core::{Config, StorageBackend};
use paynote_services::LedgerWriter;
use paynote_storage::create_backends;
use serde::Serialize;
use std::io::Read;

#[derive(Parser)]
#[command(name = "paynote-cli", about = "Paynote operator CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a payment message and show the folders it would be filed under
    Parse {
        /// Message text; read from stdin when omitted
        #[arg(long)]
        text: Option<String>,
        /// IANA timezone for the month fallback
        #[arg(long, default_value = "America/Sao_Paulo")]
        timezone: String,
    },
    /// Load configuration, connect to the storage backends and ensure the ledger header
    Check,
}

#[derive(Serialize)]
struct CheckReport {
    backend: StorageBackend,
    root_folder_id: String,
    sheet_tab: String,
    header_written: bool,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { text, timezone } => {
            let timezone: Tz = timezone
                .parse()
                .map_err(|_| anyhow::anyhow!("Unknown timezone: {}", timezone))?;
            let text = match text {
                Some(text) => text,
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("Read message from stdin")?;
                    buf
                }
            };
            let today = Utc::now().with_timezone(&timezone).date_naive();
            print_json(&parse_report(&text, timezone, today))?;
        }
        Commands::Check => {
            let config = Config::from_env()?;
            config.validate().context("Configuration validation failed")?;

            let backends = create_backends(&config)
                .await
                .context("Failed to initialize storage backends")?;
            tracing::info!(backend = %backends.documents.backend_type(), "Backends ready");

            let ledger =
                LedgerWriter::new(backends.ledger, backends.sheet_tab.clone(), config.timezone());
            let header_written = ledger
                .ensure_header()
                .await
                .context("Failed to check the ledger header")?;

            print_json(&CheckReport {
                backend: backends.documents.backend_type(),
                root_folder_id: backends.root_folder_id,
                sheet_tab: backends.sheet_tab,
                header_written,
            })?;
        }
    }

    Ok(())
}
