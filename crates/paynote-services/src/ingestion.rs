//! Ingestion pipeline
//!
//! One inbound event goes through:
//!
//! ```text
//! Received -> Extracted -> (eligible? else Dropped) -> FolderResolved -> FilesArchived
//!          -> LedgerAppended -> Notified(success)
//! ```
//!
//! A failure while resolving folders, a batch where no attachment could be archived, or
//! a failed ledger append ends in Notified(failure) with the error text. Steps that
//! already completed are not undone: an entry folder may exist without a ledger row.

use chrono_tz::Tz;
use paynote_core::constants::MODAL_CALLBACK_ID;
use paynote_core::{ArchiveLocation, AttachmentRef, IngestionResult, PaymentRecord, SurfaceContext};
use paynote_slack::{ChatPlatform, MessageEvent, ViewSubmission};
use paynote_storage::{DocumentStore, Spreadsheet, StoreError};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::archive::{ArchiveResolver, AttachmentArchiver};
use crate::extraction;
use crate::ledger::LedgerWriter;
use crate::naming::FolderNamer;
use crate::notify::NotificationDispatcher;

/// Errors that end an ingestion in a failure notification.
#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("folder resolution failed: {0}")]
    Archive(#[source] StoreError),

    #[error("none of the {attempted} attachment(s) could be archived")]
    ArchiveTotal { attempted: usize },

    #[error("ledger append failed: {0}")]
    Ledger(#[source] StoreError),
}

/// Pipeline stages, as they appear in the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Extracted,
    Dropped,
    FolderResolved,
    FilesArchived,
    LedgerAppended,
    Notified,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Received => "received",
            Stage::Extracted => "extracted",
            Stage::Dropped => "dropped",
            Stage::FolderResolved => "folder_resolved",
            Stage::FilesArchived => "files_archived",
            Stage::LedgerAppended => "ledger_appended",
            Stage::Notified => "notified",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an event was not ingested. No remote call is made for a dropped event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Bot message, edit, join or any other non-user message
    NotProcessable,
    /// Message from a channel other than the configured one
    OtherChannel,
    /// Submission of a view this service did not open
    UnknownCallback,
    /// Date or amount missing
    NotEligible,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestionOutcome {
    Dropped(DropReason),
    Completed(IngestionResult),
}

/// Settings the pipeline needs from configuration.
#[derive(Debug, Clone)]
pub struct IngestionSettings {
    pub root_folder_id: String,
    pub sheet_tab: String,
    pub timezone: Tz,
    /// Only messages from this channel are ingested, when set
    pub channel_filter: Option<String>,
}

/// Sequences extraction, archiving, the ledger and notifications for both entry paths.
#[derive(Clone)]
pub struct IngestionService {
    resolver: ArchiveResolver,
    archiver: AttachmentArchiver,
    ledger: LedgerWriter,
    notifier: NotificationDispatcher,
    channel_filter: Option<String>,
}

impl IngestionService {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        spreadsheet: Arc<dyn Spreadsheet>,
        chat: Arc<dyn ChatPlatform>,
        settings: IngestionSettings,
    ) -> Self {
        let namer = FolderNamer::new(settings.timezone);
        Self {
            resolver: ArchiveResolver::new(documents.clone(), settings.root_folder_id, namer),
            archiver: AttachmentArchiver::new(chat.clone(), documents),
            ledger: LedgerWriter::new(spreadsheet, settings.sheet_tab, settings.timezone),
            notifier: NotificationDispatcher::new(chat),
            channel_filter: settings.channel_filter,
        }
    }

    pub fn ledger(&self) -> &LedgerWriter {
        &self.ledger
    }

    /// Message path: free text plus shared files.
    #[tracing::instrument(skip(self, event), fields(channel = %event.channel, ts = %event.ts))]
    pub async fn ingest_message(&self, event: &MessageEvent) -> IngestionOutcome {
        tracing::debug!(stage = %Stage::Received, "Message event received");

        if !event.is_processable() {
            return dropped(DropReason::NotProcessable);
        }
        if let Some(filter) = &self.channel_filter {
            if &event.channel != filter {
                return dropped(DropReason::OtherChannel);
            }
        }

        let record = extraction::extract(&event.text);
        let context = SurfaceContext::Message {
            channel: event.channel.clone(),
            ts: event.ts.clone(),
        };
        self.ingest(record, event.attachment_refs(), context).await
    }

    /// Modal path: structured values plus uploaded files.
    #[tracing::instrument(skip(self, submission), fields(user = %submission.user_id()))]
    pub async fn ingest_submission(&self, submission: &ViewSubmission) -> IngestionOutcome {
        tracing::debug!(stage = %Stage::Received, "View submission received");

        if submission.view.callback_id != MODAL_CALLBACK_ID {
            return dropped(DropReason::UnknownCallback);
        }

        let record = extraction::extract_from_structured(&submission.view.state.to_form());
        let attachments = submission
            .view
            .state
            .files()
            .iter()
            .map(|file| file.to_attachment_ref())
            .collect();
        let context = SurfaceContext::Modal {
            channel: submission.channel_id().to_string(),
            user_id: submission.user_id().to_string(),
        };
        self.ingest(record, attachments, context).await
    }

    async fn ingest(
        &self,
        record: PaymentRecord,
        attachments: Vec<AttachmentRef>,
        context: SurfaceContext,
    ) -> IngestionOutcome {
        tracing::debug!(
            stage = %Stage::Extracted,
            date = %record.date,
            amount = %record.amount,
            bank = %record.bank,
            company = %record.company,
            cost_center = %record.cost_center,
            "Fields extracted"
        );

        if !extraction::is_eligible(&record) {
            return dropped(DropReason::NotEligible);
        }

        IngestionOutcome::Completed(self.run(record, attachments, context).await)
    }

    /// Run the write sequence for an eligible record and report the outcome.
    #[tracing::instrument(skip_all, fields(channel = %context.channel(), attachments = attachments.len()))]
    pub async fn run(
        &self,
        record: PaymentRecord,
        attachments: Vec<AttachmentRef>,
        context: SurfaceContext,
    ) -> IngestionResult {
        if let Err(e) = self.ledger.ensure_header().await {
            tracing::warn!(error = %e, "Could not check the ledger header, continuing");
        }

        let (result, location) = match self.write(&record, &attachments).await {
            Ok((location, file_count)) => {
                self.notifier
                    .notify_success(&context, &record, &location, file_count)
                    .await;
                (IngestionResult::succeeded(location, file_count), None)
            }
            Err(failure) => {
                tracing::error!(
                    error = %failure.error,
                    folder_id = failure.location.as_ref().map(|l| l.entry_folder_id.as_str()),
                    "Ingestion failed"
                );
                self.notifier
                    .notify_failure(&context, &failure.error.to_string())
                    .await;
                (
                    IngestionResult::failed(
                        failure.error.to_string(),
                        failure.location.clone(),
                        failure.file_count,
                    ),
                    failure.location,
                )
            }
        };

        tracing::info!(
            stage = %Stage::Notified,
            success = result.success,
            file_count = result.file_count,
            orphaned_folder = location.as_ref().map(|l| l.shareable_link.as_str()),
            "Ingestion finished"
        );
        result
    }

    async fn write(
        &self,
        record: &PaymentRecord,
        attachments: &[AttachmentRef],
    ) -> Result<(ArchiveLocation, usize), Failure> {
        let location = self
            .resolver
            .resolve_entry_folder(record)
            .await
            .map_err(|e| Failure::new(IngestionError::Archive(e), None, 0))?;
        tracing::info!(
            stage = %Stage::FolderResolved,
            folder_id = %location.entry_folder_id,
            link = %location.shareable_link,
            "Folder resolved"
        );

        let file_count = self.archiver.archive_all(attachments, &location).await;
        tracing::info!(
            stage = %Stage::FilesArchived,
            archived = file_count,
            attempted = attachments.len(),
            "Attachments archived"
        );
        if !attachments.is_empty() && file_count == 0 {
            return Err(Failure::new(
                IngestionError::ArchiveTotal {
                    attempted: attachments.len(),
                },
                Some(location),
                0,
            ));
        }

        if let Err(e) = self
            .ledger
            .append_row(record, &location.shareable_link)
            .await
        {
            return Err(Failure::new(
                IngestionError::Ledger(e),
                Some(location),
                file_count,
            ));
        }
        tracing::info!(stage = %Stage::LedgerAppended, "Ledger updated");

        Ok((location, file_count))
    }
}

/// An error plus whatever had been written before it.
struct Failure {
    error: IngestionError,
    location: Option<ArchiveLocation>,
    file_count: usize,
}

impl Failure {
    fn new(error: IngestionError, location: Option<ArchiveLocation>, file_count: usize) -> Self {
        Self {
            error,
            location,
            file_count,
        }
    }
}

fn dropped(reason: DropReason) -> IngestionOutcome {
    tracing::debug!(stage = %Stage::Dropped, reason = ?reason, "Event dropped");
    IngestionOutcome::Dropped(reason)
}
