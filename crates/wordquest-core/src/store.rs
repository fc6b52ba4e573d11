//! In-memory document store.
//!
//! Used by tests and by callers that do not need durable progress. Writes
//! can be switched to fail so persistence-failure paths are testable.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::StoreError;
use crate::traits::{Collection, Document, DocumentStore, ListQuery};

/// A process-local [`DocumentStore`] keeping documents in insertion order.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<Collection, Vec<Document>>>,
    fail_writes: AtomicBool,
    write_count: AtomicU32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `create`/`update` fail with `Unavailable`.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> u32 {
        self.write_count.load(Ordering::Relaxed)
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Collection, Vec<Document>>>, StoreError> {
        self.collections
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("writes disabled".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn create(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<Document, StoreError> {
        self.check_writable()?;
        let mut collections = self.lock()?;
        let docs = collections.entry(collection).or_default();
        if docs.iter().any(|d| d.id == document.id) {
            return Err(StoreError::AlreadyExists {
                collection,
                id: document.id,
            });
        }
        docs.push(document.clone());
        self.write_count.fetch_add(1, Ordering::Relaxed);
        Ok(document)
    }

    async fn list(
        &self,
        collection: Collection,
        query: &ListQuery,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.lock()?;
        Ok(collections
            .get(&collection)
            .map(|docs| query.apply(docs))
            .unwrap_or_default())
    }

    async fn update(
        &self,
        collection: Collection,
        id: Uuid,
        patch: Map<String, Value>,
    ) -> Result<Document, StoreError> {
        self.check_writable()?;
        let mut collections = self.lock()?;
        let document = collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
            .ok_or(StoreError::NotFound { collection, id })?;
        document.merge(patch);
        self.write_count.fetch_add(1, Ordering::Relaxed);
        Ok(document.clone())
    }
}
