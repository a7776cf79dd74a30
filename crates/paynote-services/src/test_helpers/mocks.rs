//! Recording mocks of the storage and chat capabilities
//!
//! Every mock is cheap to clone and clones share state, so a test keeps one handle for
//! assertions and gives another to the code under test.

use async_trait::async_trait;
use bytes::Bytes;
use paynote_slack::{ChatPlatform, SlackError, SlackFile, SlackResult};
use paynote_storage::{DocumentStore, Spreadsheet, StorageBackend, StoreError, StoreResult};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct Folder {
    id: String,
    name: String,
    parent_id: String,
}

/// A file handed to [`MockDocumentStore::upload_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub parent_id: String,
    pub name: String,
    pub mime_type: String,
    pub content: Bytes,
}

#[derive(Default)]
struct DocumentState {
    folders: Vec<Folder>,
    uploads: Vec<UploadedFile>,
    calls: usize,
    fail_find: bool,
    fail_create: bool,
    fail_link: bool,
    fail_uploads: HashSet<String>,
}

/// In-memory document store
#[derive(Clone, Default)]
pub struct MockDocumentStore {
    state: Arc<Mutex<DocumentState>>,
}

impl MockDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an existing folder and return its id.
    pub fn seed_folder(&self, name: &str, parent_id: &str) -> String {
        let mut state = self.state.lock().unwrap();
        let id = format!("folder-{}", state.folders.len() + 1);
        state.folders.push(Folder {
            id: id.clone(),
            name: name.to_string(),
            parent_id: parent_id.to_string(),
        });
        id
    }

    pub fn fail_find(&self, fail: bool) {
        self.state.lock().unwrap().fail_find = fail;
    }

    pub fn fail_create(&self, fail: bool) {
        self.state.lock().unwrap().fail_create = fail;
    }

    pub fn fail_link(&self, fail: bool) {
        self.state.lock().unwrap().fail_link = fail;
    }

    /// Make uploads of files named `name` fail.
    pub fn fail_upload_of(&self, name: &str) {
        self.state
            .lock()
            .unwrap()
            .fail_uploads
            .insert(name.to_string());
    }

    pub fn folder_count(&self) -> usize {
        self.state.lock().unwrap().folders.len()
    }

    pub fn folder_name(&self, id: &str) -> Option<String> {
        self.find(id).map(|f| f.name)
    }

    pub fn folder_parent(&self, id: &str) -> Option<String> {
        self.find(id).map(|f| f.parent_id)
    }

    pub fn uploads(&self) -> Vec<UploadedFile> {
        self.state.lock().unwrap().uploads.clone()
    }

    /// Number of trait calls received, failed ones included.
    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls
    }

    fn find(&self, id: &str) -> Option<Folder> {
        self.state
            .lock()
            .unwrap()
            .folders
            .iter()
            .find(|f| f.id == id)
            .cloned()
    }
}

#[async_trait]
impl DocumentStore for MockDocumentStore {
    async fn find_folder(&self, name: &str, parent_id: &str) -> StoreResult<Option<String>> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        if state.fail_find {
            return Err(StoreError::LookupFailed("mock lookup failure".to_string()));
        }
        Ok(state
            .folders
            .iter()
            .find(|f| f.name == name && f.parent_id == parent_id)
            .map(|f| f.id.clone()))
    }

    async fn create_folder(&self, name: &str, parent_id: &str) -> StoreResult<String> {
        {
            let mut state = self.state.lock().unwrap();
            state.calls += 1;
            if state.fail_create {
                return Err(StoreError::CreateFailed("mock create failure".to_string()));
            }
        }
        Ok(self.seed_folder(name, parent_id))
    }

    async fn get_shareable_link(&self, folder_id: &str) -> StoreResult<String> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        if state.fail_link {
            return Err(StoreError::LinkFailed("mock link failure".to_string()));
        }
        Ok(format!("https://drive.test/folders/{}", folder_id))
    }

    async fn upload_file(
        &self,
        parent_id: &str,
        content: Bytes,
        name: &str,
        mime_type: &str,
    ) -> StoreResult<String> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        if state.fail_uploads.contains(name) {
            return Err(StoreError::UploadFailed(format!("mock upload failure: {}", name)));
        }
        state.uploads.push(UploadedFile {
            parent_id: parent_id.to_string(),
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            content,
        });
        Ok(format!("file-{}", state.uploads.len()))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[derive(Default)]
struct SheetState {
    first_row: Option<Vec<String>>,
    writes: Vec<(String, Vec<Vec<String>>)>,
    appends: Vec<(String, Vec<String>)>,
    calls: usize,
    fail_read: bool,
    fail_append: bool,
}

/// In-memory ledger that only models the first row and the appended rows.
#[derive(Clone, Default)]
pub struct MockSpreadsheet {
    state: Arc<Mutex<SheetState>>,
}

impl MockSpreadsheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_first_row(&self, row: Vec<String>) {
        self.state.lock().unwrap().first_row = Some(row);
    }

    pub fn fail_read(&self, fail: bool) {
        self.state.lock().unwrap().fail_read = fail;
    }

    pub fn fail_append(&self, fail: bool) {
        self.state.lock().unwrap().fail_append = fail;
    }

    pub fn writes(&self) -> Vec<(String, Vec<Vec<String>>)> {
        self.state.lock().unwrap().writes.clone()
    }

    pub fn appended_rows(&self) -> Vec<(String, Vec<String>)> {
        self.state.lock().unwrap().appends.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls
    }
}

#[async_trait]
impl Spreadsheet for MockSpreadsheet {
    async fn read_range(&self, _range: &str) -> StoreResult<Vec<Vec<String>>> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        if state.fail_read {
            return Err(StoreError::ReadFailed("mock read failure".to_string()));
        }
        Ok(state.first_row.clone().into_iter().collect())
    }

    async fn write_range(&self, range: &str, rows: Vec<Vec<String>>) -> StoreResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        state.first_row = rows.first().cloned();
        state.writes.push((range.to_string(), rows));
        Ok(())
    }

    async fn append_row(&self, range: &str, row: Vec<String>) -> StoreResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        if state.fail_append {
            return Err(StoreError::WriteFailed("mock append failure".to_string()));
        }
        state.appends.push((range.to_string(), row));
        Ok(())
    }
}

/// Outbound chat call, in the order it was made.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCall {
    Reaction {
        channel: String,
        ts: String,
        emoji: String,
    },
    ThreadReply {
        channel: String,
        ts: String,
        text: String,
    },
    Message {
        channel: String,
        text: String,
        blocks: Option<Value>,
    },
    OpenModal {
        trigger_id: String,
        view: Value,
    },
}

#[derive(Default)]
struct ChatState {
    files: HashMap<String, Bytes>,
    file_info: HashMap<String, SlackFile>,
    calls: Vec<ChatCall>,
    downloads: Vec<String>,
    fail_all: bool,
}

/// Chat platform serving registered files and recording every message it is asked to send.
///
/// Downloads of unregistered URLs fail.
#[derive(Clone, Default)]
pub struct MockChatPlatform {
    state: Arc<Mutex<ChatState>>,
}

impl MockChatPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, url: &str, content: Bytes) {
        self.state
            .lock()
            .unwrap()
            .files
            .insert(url.to_string(), content);
    }

    pub fn add_file_info(&self, file: SlackFile) {
        self.state
            .lock()
            .unwrap()
            .file_info
            .insert(file.id.clone(), file);
    }

    /// Make every outbound message fail (after being recorded).
    pub fn fail_all(&self, fail: bool) {
        self.state.lock().unwrap().fail_all = fail;
    }

    pub fn calls(&self) -> Vec<ChatCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// URLs passed to `download_file`.
    pub fn downloads(&self) -> Vec<String> {
        self.state.lock().unwrap().downloads.clone()
    }

    fn record(&self, call: ChatCall) -> SlackResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.fail_all {
            return Err(SlackError::Api {
                method: "mock".to_string(),
                error: "mock_failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ChatPlatform for MockChatPlatform {
    async fn download_file(&self, url: &str) -> SlackResult<Bytes> {
        let mut state = self.state.lock().unwrap();
        state.downloads.push(url.to_string());
        state
            .files
            .get(url)
            .cloned()
            .ok_or_else(|| SlackError::Download(format!("HTTP 404 for {}", url)))
    }

    async fn add_reaction(&self, channel: &str, ts: &str, emoji: &str) -> SlackResult<()> {
        self.record(ChatCall::Reaction {
            channel: channel.to_string(),
            ts: ts.to_string(),
            emoji: emoji.to_string(),
        })
    }

    async fn post_thread_reply(&self, channel: &str, ts: &str, text: &str) -> SlackResult<()> {
        self.record(ChatCall::ThreadReply {
            channel: channel.to_string(),
            ts: ts.to_string(),
            text: text.to_string(),
        })
    }

    async fn post_message(
        &self,
        channel: &str,
        text: &str,
        blocks: Option<Value>,
    ) -> SlackResult<()> {
        self.record(ChatCall::Message {
            channel: channel.to_string(),
            text: text.to_string(),
            blocks,
        })
    }

    async fn open_modal(&self, trigger_id: &str, view: Value) -> SlackResult<()> {
        self.record(ChatCall::OpenModal {
            trigger_id: trigger_id.to_string(),
            view,
        })
    }

    async fn get_file_info(&self, file_id: &str) -> SlackResult<SlackFile> {
        self.state
            .lock()
            .unwrap()
            .file_info
            .get(file_id)
            .cloned()
            .ok_or_else(|| SlackError::Api {
                method: "files.info".to_string(),
                error: "file_not_found".to_string(),
            })
    }
}
