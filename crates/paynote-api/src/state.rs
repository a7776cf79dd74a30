//! Application state shared by the handlers.

use paynote_services::IngestionService;
use paynote_slack::ChatPlatform;
use std::sync::Arc;
use tokio_util::task::TaskTracker;

#[derive(Clone)]
pub struct AppState {
    pub ingestion: Arc<IngestionService>,
    /// Used directly by the slash command handler to open the modal
    pub chat: Arc<dyn ChatPlatform>,
    /// Slash command that opens the payment modal, e.g. `/lancamento`
    pub slash_command: String,
    /// Modal ingestions answered before they finish; drained on shutdown
    pub background: TaskTracker,
    /// Echo decoding errors back to the caller (off in production)
    pub expose_error_details: bool,
}
