//! wordquest-store — File-backed document store.
//!
//! Each collection lives in `<data_dir>/<collection>.json` as a JSON array
//! of documents. Every write replaces the whole file through a temporary
//! file in the same directory, so readers see either the old or the new
//! contents, never a partial write.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use uuid::Uuid;

use wordquest_core::error::StoreError;
use wordquest_core::traits::{Collection, Document, DocumentStore, ListQuery};

/// A [`DocumentStore`] persisting each collection to one JSON file.
pub struct JsonFileStore {
    data_dir: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open a store rooted at `data_dir`, creating the directory if needed.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir).map_err(|e| {
            StoreError::Io(format!(
                "failed to create data directory {}: {e}",
                data_dir.display()
            ))
        })?;
        Ok(Self {
            data_dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the file backing `collection`.
    pub fn collection_path(&self, collection: Collection) -> PathBuf {
        self.data_dir.join(format!("{}.json", collection.name()))
    }

    async fn read_collection(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        let path = self.collection_path(collection);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::Io(format!(
                    "failed to read {}: {e}",
                    path.display()
                )))
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&bytes).map_err(|e| {
            StoreError::Serialization(format!("corrupt collection file {}: {e}", path.display()))
        })
    }

    async fn write_collection(
        &self,
        collection: Collection,
        documents: &[Document],
    ) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(documents)?;
        let dir = self.data_dir.clone();
        let path = self.collection_path(collection);

        tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
            let mut file = NamedTempFile::new_in(&dir)?;
            file.write_all(&json)?;
            file.as_file().sync_all()?;
            file.persist(&path).map_err(|e| {
                StoreError::Io(format!("failed to replace {}: {}", path.display(), e.error))
            })?;
            Ok(())
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("write task failed: {e}")))?
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    fn name(&self) -> &str {
        "json-file"
    }

    #[tracing::instrument(skip_all, fields(collection = %collection, id = %document.id))]
    async fn create(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<Document, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut documents = self.read_collection(collection).await?;
        if documents.iter().any(|d| d.id == document.id) {
            return Err(StoreError::AlreadyExists {
                collection,
                id: document.id,
            });
        }
        documents.push(document.clone());
        self.write_collection(collection, &documents).await?;
        tracing::debug!(count = documents.len(), "document created");
        Ok(document)
    }

    #[tracing::instrument(skip_all, fields(collection = %collection))]
    async fn list(
        &self,
        collection: Collection,
        query: &ListQuery,
    ) -> Result<Vec<Document>, StoreError> {
        let documents = self.read_collection(collection).await?;
        Ok(query.apply(&documents))
    }

    #[tracing::instrument(skip_all, fields(collection = %collection, id = %id))]
    async fn update(
        &self,
        collection: Collection,
        id: Uuid,
        patch: Map<String, Value>,
    ) -> Result<Document, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut documents = self.read_collection(collection).await?;
        let document = documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(StoreError::NotFound { collection, id })?;
        document.merge(patch);
        let updated = document.clone();
        self.write_collection(collection, &documents).await?;
        tracing::debug!("document updated");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use chrono::{Duration, Utc};
    use serde_json::json;
    use wordquest_core::model::{GameType, PlayerId, SessionResult, WordId};
    use wordquest_core::progress::ProgressAggregator;
    use wordquest_core::traits::Direction;

    fn doc(fields: Value) -> Document {
        match fields {
            Value::Object(fields) => Document {
                id: Uuid::new_v4(),
                fields,
            },
            _ => panic!("expected object"),
        }
    }

    #[tokio::test]
    async fn missing_files_are_empty_collections() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        let listed = store
            .list(Collection::Sessions, &ListQuery::new())
            .await
            .unwrap();
        assert!(listed.is_empty());
        assert!(!store.collection_path(Collection::Sessions).exists());
    }

    #[tokio::test]
    async fn documents_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let created = {
            let store = JsonFileStore::open(dir.path()).unwrap();
            store
                .create(Collection::Progress, doc(json!({"player_id": "ann", "total_score": 3})))
                .await
                .unwrap()
        };

        let store = JsonFileStore::open(dir.path()).unwrap();
        let mut patch = Map::new();
        patch.insert("total_score".into(), json!(13));
        let updated = store
            .update(Collection::Progress, created.id, patch)
            .await
            .unwrap();
        assert_eq!(updated.fields["total_score"], json!(13));
        assert_eq!(updated.fields["player_id"], json!("ann"));

        let reopened = JsonFileStore::open(dir.path()).unwrap();
        let listed = reopened
            .list(
                Collection::Progress,
                &ListQuery::new().where_eq("player_id", "ann"),
            )
            .await
            .unwrap();
        assert_eq!(listed, vec![updated]);
        assert!(dir.path().join("progress.json").exists());
    }

    #[tokio::test]
    async fn duplicate_and_missing_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        let d = doc(json!({"n": 1}));
        store.create(Collection::Sessions, d.clone()).await.unwrap();

        let err = store.create(Collection::Sessions, d).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));

        let err = store
            .update(Collection::Sessions, Uuid::new_v4(), Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn list_orders_by_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        let now = Utc::now();
        for offset in [2, 0, 1] {
            let at = (now + Duration::seconds(offset)).to_rfc3339();
            store
                .create(
                    Collection::Sessions,
                    doc(json!({"offset": offset, "completed_at": at})),
                )
                .await
                .unwrap();
        }

        let query = ListQuery::new()
            .order_by("completed_at", Direction::Desc)
            .limit(Some(2));
        let listed = store.list(Collection::Sessions, &query).await.unwrap();
        let offsets: Vec<_> = listed.iter().map(|d| d.fields["offset"].clone()).collect();
        assert_eq!(offsets, vec![json!(2), json!(1)]);
    }

    #[tokio::test]
    async fn corrupt_file_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        std::fs::write(store.collection_path(Collection::Progress), "{not json").unwrap();

        let err = store
            .list(Collection::Progress, &ListQuery::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn aggregator_progress_persists_across_restarts() {
        let dir = tempfile::tempdir().unwrap();
        let player = PlayerId::new("ann");
        let words: BTreeSet<WordId> = (1..=4).map(WordId).collect();

        {
            let store = Arc::new(JsonFileStore::open(dir.path()).unwrap());
            let aggregator = ProgressAggregator::new(store);
            let result = SessionResult::new(GameType::Quiz, 3, 3, 4, words.clone());
            let outcome = aggregator.fold(&player, &result).await.unwrap();
            assert!(outcome.is_persisted());
        }

        let store = Arc::new(JsonFileStore::open(dir.path()).unwrap());
        let aggregator = ProgressAggregator::new(store);
        let progress = aggregator.get_progress(&player).await.unwrap();
        assert_eq!(progress.total_score, 3);
        assert_eq!(progress.words_learned, words);

        let history = aggregator.history(&player, Some(10)).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].game_type, GameType::Quiz);
    }
}
