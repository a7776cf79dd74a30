use paynote_core::{ArchiveLocation, Attachment, AttachmentRef};
use paynote_slack::ChatPlatform;
use paynote_storage::DocumentStore;
use std::sync::Arc;

/// Copies attachments from the chat platform into the resolved entry folder.
#[derive(Clone)]
pub struct AttachmentArchiver {
    chat: Arc<dyn ChatPlatform>,
    documents: Arc<dyn DocumentStore>,
}

impl AttachmentArchiver {
    pub fn new(chat: Arc<dyn ChatPlatform>, documents: Arc<dyn DocumentStore>) -> Self {
        Self { chat, documents }
    }

    /// Archive `attachments` one at a time, in order, and return how many made it.
    ///
    /// A file that cannot be downloaded or uploaded is logged and skipped; the rest of
    /// the batch still runs.
    #[tracing::instrument(skip(self, attachments, location), fields(
        attachment_count = attachments.len(),
        folder_id = %location.entry_folder_id,
    ))]
    pub async fn archive_all(
        &self,
        attachments: &[AttachmentRef],
        location: &ArchiveLocation,
    ) -> usize {
        let mut archived = 0;

        for attachment_ref in attachments {
            let Some(attachment) = self.download(attachment_ref).await else {
                continue;
            };

            match self
                .documents
                .upload_file(
                    &location.entry_folder_id,
                    attachment.content,
                    &attachment.display_name,
                    &attachment.mime_type,
                )
                .await
            {
                Ok(stored_id) => {
                    tracing::debug!(
                        file_name = %attachment.display_name,
                        source_id = %attachment.source_id,
                        stored_id = %stored_id,
                        "Attachment archived"
                    );
                    archived += 1;
                }
                Err(e) => {
                    tracing::error!(
                        file_name = %attachment.display_name,
                        source_id = %attachment.source_id,
                        error = %e,
                        "Failed to upload attachment, skipping"
                    );
                }
            }
        }

        archived
    }

    async fn download(&self, attachment_ref: &AttachmentRef) -> Option<Attachment> {
        let url = match &attachment_ref.download_url {
            Some(url) => url.clone(),
            None => self.lookup_download_url(attachment_ref).await?,
        };

        match self.chat.download_file(&url).await {
            Ok(content) => Some(Attachment {
                source_id: attachment_ref.source_id.clone(),
                display_name: attachment_ref.display_name.clone(),
                mime_type: attachment_ref.mime_type.clone(),
                content,
            }),
            Err(e) => {
                tracing::error!(
                    file_name = %attachment_ref.display_name,
                    error = %e,
                    "Failed to download attachment, skipping"
                );
                None
            }
        }
    }

    /// Some uploads arrive without URLs; ask the platform for the file's metadata.
    async fn lookup_download_url(&self, attachment_ref: &AttachmentRef) -> Option<String> {
        match self.chat.get_file_info(&attachment_ref.source_id).await {
            Ok(file) => {
                let url = file.download_url().map(String::from);
                if url.is_none() {
                    tracing::warn!(
                        file_id = %attachment_ref.source_id,
                        file_name = %attachment_ref.display_name,
                        "Attachment has no download URL, skipping"
                    );
                }
                url
            }
            Err(e) => {
                tracing::warn!(
                    file_id = %attachment_ref.source_id,
                    error = %e,
                    "File info lookup failed, skipping attachment"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{MockChatPlatform, MockDocumentStore};
    use bytes::Bytes;
    use paynote_slack::SlackFile;
    use paynote_storage::LocalDocumentStore;

    fn attachment(id: &str, url: Option<&str>) -> AttachmentRef {
        AttachmentRef {
            source_id: id.to_string(),
            display_name: format!("{}.pdf", id),
            mime_type: "application/pdf".to_string(),
            download_url: url.map(String::from),
        }
    }

    fn location() -> ArchiveLocation {
        ArchiveLocation {
            month_folder_id: "month".into(),
            entry_folder_id: "entry".into(),
            shareable_link: "https://drive.test/entry".into(),
        }
    }

    #[tokio::test]
    async fn test_one_failed_download_of_three() {
        let chat = MockChatPlatform::new();
        chat.add_file("https://files/a", Bytes::from_static(b"a"));
        chat.add_file("https://files/c", Bytes::from_static(b"c"));
        let store = MockDocumentStore::new();
        let archiver = AttachmentArchiver::new(Arc::new(chat.clone()), Arc::new(store.clone()));

        let count = archiver
            .archive_all(
                &[
                    attachment("a", Some("https://files/a")),
                    attachment("b", Some("https://files/b")),
                    attachment("c", Some("https://files/c")),
                ],
                &location(),
            )
            .await;

        assert_eq!(count, 2);
        let uploads = store.uploads();
        assert_eq!(
            uploads.iter().map(|u| u.name.as_str()).collect::<Vec<_>>(),
            vec!["a.pdf", "c.pdf"]
        );
        assert!(uploads.iter().all(|u| u.parent_id == "entry"));
        assert_eq!(uploads[1].content, Bytes::from_static(b"c"));
    }

    #[tokio::test]
    async fn test_upload_failure_is_skipped() {
        let chat = MockChatPlatform::new();
        chat.add_file("https://files/a", Bytes::from_static(b"a"));
        chat.add_file("https://files/b", Bytes::from_static(b"b"));
        let store = MockDocumentStore::new();
        store.fail_upload_of("a.pdf");
        let archiver = AttachmentArchiver::new(Arc::new(chat), Arc::new(store.clone()));

        let count = archiver
            .archive_all(
                &[
                    attachment("a", Some("https://files/a")),
                    attachment("b", Some("https://files/b")),
                ],
                &location(),
            )
            .await;
        assert_eq!(count, 1);
        assert_eq!(store.uploads()[0].name, "b.pdf");
    }

    #[tokio::test]
    async fn test_missing_url_resolved_through_file_info() {
        let chat = MockChatPlatform::new();
        chat.add_file_info(SlackFile {
            id: "F1".into(),
            url_private: Some("https://files/F1".into()),
            ..Default::default()
        });
        chat.add_file("https://files/F1", Bytes::from_static(b"x"));
        let store = MockDocumentStore::new();
        let archiver = AttachmentArchiver::new(Arc::new(chat), Arc::new(store.clone()));

        let count = archiver
            .archive_all(&[attachment("F1", None), attachment("F2", None)], &location())
            .await;
        assert_eq!(count, 1);
        assert_eq!(store.uploads()[0].name, "F1.pdf");
    }

    #[tokio::test]
    async fn test_same_named_attachments_on_local_store() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = LocalDocumentStore::new(dir.path(), "http://localhost/archive".to_string())
            .await
            .unwrap();
        let entry = store.create_folder("2025-02", "").await.unwrap();

        let chat = MockChatPlatform::new();
        chat.add_file("https://files/1", Bytes::from_static(b"one"));
        chat.add_file("https://files/2", Bytes::from_static(b"two"));
        let archiver = AttachmentArchiver::new(Arc::new(chat), Arc::new(store));

        let unnamed = |id: &str, url: &str| AttachmentRef {
            display_name: "arquivo".to_string(),
            ..attachment(id, Some(url))
        };
        let location = ArchiveLocation {
            entry_folder_id: entry,
            ..location()
        };
        let count = archiver
            .archive_all(
                &[unnamed("F1", "https://files/1"), unnamed("F2", "https://files/2")],
                &location,
            )
            .await;

        assert_eq!(count, 2);
        let folder = dir.path().join("2025-02");
        assert_eq!(std::fs::read_dir(&folder).unwrap().count(), 2);
        assert_eq!(std::fs::read(folder.join("arquivo")).unwrap(), b"one");
        assert_eq!(std::fs::read(folder.join("arquivo (1)")).unwrap(), b"two");
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let archiver = AttachmentArchiver::new(
            Arc::new(MockChatPlatform::new()),
            Arc::new(MockDocumentStore::new()),
        );
        assert_eq!(archiver.archive_all(&[], &location()).await, 0);
    }
}
