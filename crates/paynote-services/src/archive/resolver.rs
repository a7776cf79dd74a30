use paynote_core::{ArchiveLocation, PaymentRecord};
use paynote_storage::{DocumentStore, StoreResult};
use std::sync::Arc;

use crate::naming::FolderNamer;

/// Find-or-create of `root / month / entry` in the document store.
///
/// Holds no state between calls. Two concurrent ingestions for the same record can both
/// miss the lookup and create sibling folders with the same name; that is accepted.
#[derive(Clone)]
pub struct ArchiveResolver {
    documents: Arc<dyn DocumentStore>,
    root_folder_id: String,
    namer: FolderNamer,
}

impl ArchiveResolver {
    pub fn new(documents: Arc<dyn DocumentStore>, root_folder_id: String, namer: FolderNamer) -> Self {
        Self {
            documents,
            root_folder_id,
            namer,
        }
    }

    #[tracing::instrument(skip(self, record))]
    pub async fn resolve_entry_folder(&self, record: &PaymentRecord) -> StoreResult<ArchiveLocation> {
        let month_name = self.namer.month_folder_name(record);
        let month_folder_id = self.find_or_create(&month_name, &self.root_folder_id).await?;

        let entry_name = self.namer.entry_folder_name(record);
        let entry_folder_id = self.find_or_create(&entry_name, &month_folder_id).await?;

        let shareable_link = self.documents.get_shareable_link(&entry_folder_id).await?;

        tracing::info!(
            month_folder = %month_name,
            entry_folder = %entry_name,
            folder_id = %entry_folder_id,
            "Archive folder resolved"
        );

        Ok(ArchiveLocation {
            month_folder_id,
            entry_folder_id,
            shareable_link,
        })
    }

    async fn find_or_create(&self, name: &str, parent_id: &str) -> StoreResult<String> {
        if let Some(id) = self.documents.find_folder(name, parent_id).await? {
            tracing::debug!(folder_name = %name, folder_id = %id, "Folder found");
            return Ok(id);
        }
        self.documents.create_folder(name, parent_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::MockDocumentStore;
    use paynote_storage::StoreError;

    fn record() -> PaymentRecord {
        PaymentRecord {
            date: "04/02/2025".into(),
            amount: "R$ 10".into(),
            bank: "Itau".into(),
            ..Default::default()
        }
    }

    fn resolver(store: &MockDocumentStore) -> ArchiveResolver {
        ArchiveResolver::new(
            Arc::new(store.clone()),
            "root".to_string(),
            FolderNamer::new(chrono_tz::UTC),
        )
    }

    #[tokio::test]
    async fn test_creates_hierarchy_once() {
        let store = MockDocumentStore::new();
        let resolver = resolver(&store);

        let first = resolver.resolve_entry_folder(&record()).await.unwrap();
        let second = resolver.resolve_entry_folder(&record()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.folder_count(), 2);
        assert_eq!(store.folder_name(&first.month_folder_id).as_deref(), Some("2025-02"));
        assert_eq!(
            store.folder_name(&first.entry_folder_id).as_deref(),
            Some("2025-02-04_R$10_Itau")
        );
        assert_eq!(store.folder_parent(&first.month_folder_id).as_deref(), Some("root"));
        assert_eq!(
            store.folder_parent(&first.entry_folder_id),
            Some(first.month_folder_id.clone())
        );
        assert!(first.shareable_link.ends_with(&first.entry_folder_id));
    }

    #[tokio::test]
    async fn test_reuses_existing_month_folder() {
        let store = MockDocumentStore::new();
        let month_id = store.seed_folder("2025-02", "root");
        let location = resolver(&store).resolve_entry_folder(&record()).await.unwrap();
        assert_eq!(location.month_folder_id, month_id);
        assert_eq!(store.folder_count(), 2);
    }

    #[tokio::test]
    async fn test_lookup_failure_creates_nothing() {
        let store = MockDocumentStore::new();
        store.fail_find(true);
        let err = resolver(&store).resolve_entry_folder(&record()).await.unwrap_err();
        assert!(matches!(err, StoreError::LookupFailed(_)));
        assert_eq!(store.folder_count(), 0);
    }

    #[tokio::test]
    async fn test_link_failure_is_an_error() {
        let store = MockDocumentStore::new();
        store.fail_link(true);
        assert!(matches!(
            resolver(&store).resolve_entry_folder(&record()).await,
            Err(StoreError::LinkFailed(_))
        ));
    }
}
