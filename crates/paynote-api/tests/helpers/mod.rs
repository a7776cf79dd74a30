//! Test helpers: the full router over in-memory backends.
//!
//! Run from the workspace root: `cargo test -p paynote-api`.

use axum_test::TestServer;
use paynote_api::setup::routes::build_router;
use paynote_api::state::AppState;
use paynote_infra::SignatureVerifier;
use paynote_services::test_helpers::{MockChatPlatform, MockDocumentStore, MockSpreadsheet};
use paynote_services::{IngestionService, IngestionSettings};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::task::TaskTracker;

pub const SLASH_COMMAND: &str = "/lancamento";
pub const SIGNING_SECRET: &str = "test-signing-secret";

/// Test application: server plus handles on every mock it talks to.
pub struct TestApp {
    pub server: TestServer,
    pub documents: MockDocumentStore,
    pub spreadsheet: MockSpreadsheet,
    pub chat: MockChatPlatform,
    /// Tracker the interactions handler spawns modal ingestions on
    pub background: TaskTracker,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Wait for work done on a detached task to reach the ledger.
    pub async fn wait_for_rows(&self, count: usize) {
        for _ in 0..100 {
            if self.spreadsheet.appended_rows().len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!(
            "expected {} ledger row(s), found {}",
            count,
            self.spreadsheet.appended_rows().len()
        );
    }

    /// Wait for a detached task to post `count` chat calls.
    pub async fn wait_for_chat_calls(&self, count: usize) {
        for _ in 0..100 {
            if self.chat.calls().len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!(
            "expected {} chat call(s), found {}",
            count,
            self.chat.calls().len()
        );
    }
}

fn build(signing_secret: Option<&str>) -> TestApp {
    let documents = MockDocumentStore::new();
    let spreadsheet = MockSpreadsheet::new();
    let chat = MockChatPlatform::new();

    let ingestion = IngestionService::new(
        Arc::new(documents.clone()),
        Arc::new(spreadsheet.clone()),
        Arc::new(chat.clone()),
        IngestionSettings {
            root_folder_id: "root".to_string(),
            sheet_tab: "Lancamentos".to_string(),
            timezone: chrono_tz::America::Sao_Paulo,
            channel_filter: None,
        },
    );
    let background = TaskTracker::new();
    let state = Arc::new(AppState {
        ingestion: Arc::new(ingestion),
        chat: Arc::new(chat.clone()),
        slash_command: SLASH_COMMAND.to_string(),
        background: background.clone(),
        expose_error_details: true,
    });
    let verifier = Arc::new(SignatureVerifier::new(signing_secret.map(String::from), 300));

    TestApp {
        server: TestServer::new(build_router(state, verifier)).unwrap(),
        documents,
        spreadsheet,
        chat,
        background,
    }
}

/// App without signature verification.
pub fn setup_test_app() -> TestApp {
    build(None)
}

/// App verifying signatures against [`SIGNING_SECRET`].
pub fn setup_signed_test_app() -> TestApp {
    build(Some(SIGNING_SECRET))
}
