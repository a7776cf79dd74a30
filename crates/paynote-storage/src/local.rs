use crate::range::SheetRange;
use crate::traits::{DocumentStore, Spreadsheet, StoreError, StoreResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Reject names that would escape their parent directory.
fn validate_name(name: &str) -> StoreResult<()> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0')
    {
        return Err(StoreError::InvalidName(format!(
            "'{}' is not a valid file or folder name",
            name
        )));
    }
    Ok(())
}

/// Upper bound on `name (n).ext` suffixes tried before giving up
const MAX_NAME_ATTEMPTS: usize = 1000;

/// `name` for the first attempt, then `stem (n).ext`.
fn numbered_name(name: &str, attempt: usize) -> String {
    if attempt == 0 {
        return name.to_string();
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{} ({}).{}", stem, attempt, ext),
        _ => format!("{} ({})", name, attempt),
    }
}

/// Local filesystem document store
///
/// Folders are directories below `base_path`; a folder id is its path relative to
/// `base_path` (the root is the empty id).
#[derive(Clone)]
pub struct LocalDocumentStore {
    base_path: PathBuf,
    base_url: String,
}

impl LocalDocumentStore {
    /// Create a new LocalDocumentStore instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory of the archive (e.g., "/var/lib/paynote/archive")
    /// * `base_url` - Base URL the archive is served from (e.g., "http://localhost:8080/archive")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StoreResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StoreError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalDocumentStore {
            base_path,
            base_url,
        })
    }

    fn child_id(parent_id: &str, name: &str) -> String {
        if parent_id.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", parent_id.trim_end_matches('/'), name)
        }
    }

    /// Filesystem path of an id; ids are only ever built by `child_id`.
    fn id_to_path(&self, id: &str) -> StoreResult<PathBuf> {
        let mut path = self.base_path.clone();
        for segment in id.split('/').filter(|s| !s.is_empty()) {
            validate_name(segment)?;
            path.push(segment);
        }
        Ok(path)
    }
}

#[async_trait]
impl DocumentStore for LocalDocumentStore {
    async fn find_folder(&self, name: &str, parent_id: &str) -> StoreResult<Option<String>> {
        validate_name(name)?;
        let id = Self::child_id(parent_id, name);
        let path = self.id_to_path(&id)?;

        match fs::metadata(&path).await {
            Ok(meta) if meta.is_dir() => Ok(Some(id)),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::LookupFailed(format!(
                "Failed to stat {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn create_folder(&self, name: &str, parent_id: &str) -> StoreResult<String> {
        validate_name(name)?;
        let id = Self::child_id(parent_id, name);
        let path = self.id_to_path(&id)?;

        match fs::create_dir(&path).await {
            Ok(()) => {
                tracing::info!(folder_name = %name, folder_id = %id, "Folder created");
                Ok(id)
            }
            // A concurrent ingestion got there first; directories cannot be duplicated
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(id),
            Err(e) => Err(StoreError::CreateFailed(format!(
                "Failed to create {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn get_shareable_link(&self, folder_id: &str) -> StoreResult<String> {
        let path = self.id_to_path(folder_id)?;
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StoreError::LinkFailed(format!(
                "Folder {} does not exist",
                folder_id
            )));
        }
        Ok(format!("{}/{}", self.base_url.trim_end_matches('/'), folder_id))
    }

    async fn upload_file(
        &self,
        parent_id: &str,
        content: Bytes,
        name: &str,
        _mime_type: &str,
    ) -> StoreResult<String> {
        validate_name(name)?;
        let size = content.len();

        // Same-named files live side by side, as they do in Drive
        let mut attempt = 0;
        let (id, path, mut file) = loop {
            let candidate = numbered_name(name, attempt);
            let id = Self::child_id(parent_id, &candidate);
            let path = self.id_to_path(&id)?;
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => break (id, path, file),
                Err(e) if e.kind() == ErrorKind::AlreadyExists && attempt < MAX_NAME_ATTEMPTS => {
                    attempt += 1;
                }
                Err(e) => {
                    return Err(StoreError::UploadFailed(format!(
                        "Failed to create file {}: {}",
                        path.display(),
                        e
                    )))
                }
            }
        };

        file.write_all(&content).await.map_err(|e| {
            StoreError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StoreError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(file_name = %name, file_id = %id, size, "File uploaded");
        Ok(id)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

/// Ledger kept as one tab-separated file per tab: `<dir>/<tab>.tsv`.
pub struct LocalSpreadsheet {
    dir: PathBuf,
    // Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl LocalSpreadsheet {
    pub async fn new(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    fn tab_path(&self, range: &SheetRange) -> StoreResult<PathBuf> {
        validate_name(&range.tab)?;
        Ok(self.dir.join(format!("{}.tsv", range.tab)))
    }

    async fn read_lines(&self, range: &SheetRange) -> StoreResult<Vec<String>> {
        let path = self.tab_path(range)?;
        match fs::read_to_string(&path).await {
            Ok(content) => Ok(content.lines().map(String::from).collect()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(StoreError::ReadFailed(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn encode_row(row: &[String]) -> String {
        row.iter()
            .map(|cell| cell.replace(['\t', '\n', '\r'], " "))
            .collect::<Vec<_>>()
            .join("\t")
    }

    fn decode_row(line: &str) -> Vec<String> {
        if line.is_empty() {
            return Vec::new();
        }
        line.split('\t').map(String::from).collect()
    }
}

#[async_trait]
impl Spreadsheet for LocalSpreadsheet {
    async fn read_range(&self, range: &str) -> StoreResult<Vec<Vec<String>>> {
        let range = SheetRange::parse(range)?;
        let lines = self.read_lines(&range).await?;

        let mut rows: Vec<Vec<String>> = lines
            .iter()
            .enumerate()
            .filter(|(index, _)| range.contains_row(*index as u32 + 1))
            .map(|(_, line)| Self::decode_row(line))
            .collect();

        // Trailing blank rows are not part of the data, as in the Sheets API
        while rows.last().is_some_and(|row| row.is_empty()) {
            rows.pop();
        }
        Ok(rows)
    }

    async fn write_range(&self, range: &str, rows: Vec<Vec<String>>) -> StoreResult<()> {
        let range = SheetRange::parse(range)?;
        let _guard = self.write_lock.lock().await;

        let mut lines = self.read_lines(&range).await?;
        let start = range.start_row.unwrap_or(1) as usize - 1;
        if lines.len() < start + rows.len() {
            lines.resize(start + rows.len(), String::new());
        }
        for (offset, row) in rows.iter().enumerate() {
            lines[start + offset] = Self::encode_row(row);
        }

        let path = self.tab_path(&range)?;
        let mut content = lines.join("\n");
        content.push('\n');
        fs::write(&path, content).await.map_err(|e| {
            StoreError::WriteFailed(format!("Failed to write {}: {}", path.display(), e))
        })
    }

    async fn append_row(&self, range: &str, row: Vec<String>) -> StoreResult<()> {
        let range = SheetRange::parse(range)?;
        let _guard = self.write_lock.lock().await;

        let path = self.tab_path(&range)?;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| {
                StoreError::WriteFailed(format!("Failed to open {}: {}", path.display(), e))
            })?;

        let mut line = Self::encode_row(&row);
        line.push('\n');
        file.write_all(line.as_bytes()).await.map_err(|e| {
            StoreError::WriteFailed(format!("Failed to append to {}: {}", path.display(), e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn document_store(dir: &TempDir) -> LocalDocumentStore {
        LocalDocumentStore::new(dir.path(), "http://localhost:8080/archive/".to_string())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_find_or_create_folder_hierarchy() {
        let dir = TempDir::new().unwrap();
        let store = document_store(&dir).await;

        assert!(store.find_folder("2025-02", "").await.unwrap().is_none());
        let month = store.create_folder("2025-02", "").await.unwrap();
        assert_eq!(month, "2025-02");
        assert_eq!(
            store.find_folder("2025-02", "").await.unwrap().as_deref(),
            Some("2025-02")
        );

        let entry = store.create_folder("2025-02-04_R$10_Itau", &month).await.unwrap();
        assert_eq!(entry, "2025-02/2025-02-04_R$10_Itau");
        assert!(dir.path().join("2025-02/2025-02-04_R$10_Itau").is_dir());

        let link = store.get_shareable_link(&entry).await.unwrap();
        assert_eq!(
            link,
            "http://localhost:8080/archive/2025-02/2025-02-04_R$10_Itau"
        );
    }

    #[tokio::test]
    async fn test_create_existing_folder_returns_same_id() {
        let dir = TempDir::new().unwrap();
        let store = document_store(&dir).await;
        let first = store.create_folder("2025-02", "").await.unwrap();
        let second = store.create_folder("2025-02", "").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_upload_writes_bytes() {
        let dir = TempDir::new().unwrap();
        let store = document_store(&dir).await;
        let folder = store.create_folder("2025-02", "").await.unwrap();

        let id = store
            .upload_file(&folder, Bytes::from_static(b"hello"), "nota.txt", "text/plain")
            .await
            .unwrap();
        assert_eq!(id, "2025-02/nota.txt");
        let written = std::fs::read(dir.path().join("2025-02/nota.txt")).unwrap();
        assert_eq!(written, b"hello");
    }

    #[tokio::test]
    async fn test_same_name_uploads_are_kept_side_by_side() {
        let dir = TempDir::new().unwrap();
        let store = document_store(&dir).await;
        let folder = store.create_folder("2025-02", "").await.unwrap();

        let mut ids = Vec::new();
        for content in [&b"first"[..], b"second", b"third"] {
            ids.push(
                store
                    .upload_file(
                        &folder,
                        Bytes::copy_from_slice(content),
                        "comprovante.pdf",
                        "application/pdf",
                    )
                    .await
                    .unwrap(),
            );
        }
        assert_eq!(
            ids,
            vec![
                "2025-02/comprovante.pdf",
                "2025-02/comprovante (1).pdf",
                "2025-02/comprovante (2).pdf",
            ]
        );
        let on_disk = std::fs::read_dir(dir.path().join("2025-02")).unwrap().count();
        assert_eq!(on_disk, 3);
        assert_eq!(
            std::fs::read(dir.path().join("2025-02/comprovante.pdf")).unwrap(),
            b"first"
        );

        let bare = store
            .upload_file(&folder, Bytes::from_static(b"x"), "arquivo", "application/octet-stream")
            .await
            .unwrap();
        let again = store
            .upload_file(&folder, Bytes::from_static(b"y"), "arquivo", "application/octet-stream")
            .await
            .unwrap();
        assert_eq!(bare, "2025-02/arquivo");
        assert_eq!(again, "2025-02/arquivo (1)");
    }

    #[test]
    fn test_numbered_name() {
        assert_eq!(numbered_name("nota.pdf", 0), "nota.pdf");
        assert_eq!(numbered_name("nota.pdf", 2), "nota (2).pdf");
        assert_eq!(numbered_name("arquivo", 1), "arquivo (1)");
        assert_eq!(numbered_name(".env", 1), ".env (1)");
        assert_eq!(numbered_name("a.tar.gz", 1), "a.tar (1).gz");
    }

    #[tokio::test]
    async fn test_rejects_traversal_names() {
        let dir = TempDir::new().unwrap();
        let store = document_store(&dir).await;
        assert!(matches!(
            store.create_folder("..", "").await,
            Err(StoreError::InvalidName(_))
        ));
        assert!(matches!(
            store
                .upload_file("", Bytes::new(), "../escape.txt", "text/plain")
                .await,
            Err(StoreError::InvalidName(_))
        ));
    }

    #[tokio::test]
    async fn test_link_for_missing_folder_fails() {
        let dir = TempDir::new().unwrap();
        let store = document_store(&dir).await;
        assert!(matches!(
            store.get_shareable_link("nope").await,
            Err(StoreError::LinkFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_spreadsheet_header_then_append() {
        let dir = TempDir::new().unwrap();
        let sheet = LocalSpreadsheet::new(dir.path()).await.unwrap();

        assert!(sheet.read_range("Lancamentos!A1:G1").await.unwrap().is_empty());

        sheet
            .write_range(
                "Lancamentos!A1:G1",
                vec![vec!["DATA".into(), "VALOR".into()]],
            )
            .await
            .unwrap();
        sheet
            .append_row("Lancamentos!A:G", vec!["04/02/2025".into(), "R$\t10".into()])
            .await
            .unwrap();
        sheet
            .append_row("Lancamentos!A:G", vec!["05/02/2025".into(), "R$ 20".into()])
            .await
            .unwrap();

        let header = sheet.read_range("Lancamentos!A1:G1").await.unwrap();
        assert_eq!(header, vec![vec!["DATA".to_string(), "VALOR".to_string()]]);

        let all = sheet.read_range("Lancamentos!A:G").await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[1], vec!["04/02/2025".to_string(), "R$ 10".to_string()]);
    }

    #[tokio::test]
    async fn test_write_range_preserves_later_rows() {
        let dir = TempDir::new().unwrap();
        let sheet = LocalSpreadsheet::new(dir.path()).await.unwrap();
        sheet
            .append_row("Tab!A:G", vec!["row".into()])
            .await
            .unwrap();
        sheet
            .append_row("Tab!A:G", vec!["row2".into()])
            .await
            .unwrap();
        sheet
            .write_range("Tab!A1:G1", vec![vec!["header".into()]])
            .await
            .unwrap();

        let all = sheet.read_range("Tab!A:G").await.unwrap();
        assert_eq!(all, vec![vec!["header".to_string()], vec!["row2".to_string()]]);
    }
}
