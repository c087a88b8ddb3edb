use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::document::{apply_find, ensure_id, id_key, Document, ID_FIELD};
use crate::query::{DeleteResult, Filter, FindOptions, InsertOneResult};
use crate::repository::DocumentStore;
use crate::{CoreError, CoreResult};

pub(crate) type CollectionTable = Arc<Mutex<HashMap<String, Vec<Document>>>>;

/// Fake store that keeps documents in memory and records the requests it
/// receives, so tests can assert on what the use case asked for.
#[derive(Clone, Default)]
pub(crate) struct RecordingStore {
    collections: CollectionTable,
    pub(crate) finds: Arc<Mutex<Vec<(String, Filter, FindOptions)>>>,
    pub(crate) counts: Arc<Mutex<Vec<(String, Filter)>>>,
    pub(crate) calls: Arc<AtomicUsize>,
    fail: bool,
}

impl RecordingStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(crate) fn seed(&self, collection: &str, docs: Vec<Value>) {
        let mut guard = self.collections.lock().expect("collections mutex poisoned");
        let entry = guard.entry(collection.to_string()).or_default();
        for value in docs {
            let mut doc = value.as_object().cloned().expect("seed must be an object");
            ensure_id(&mut doc);
            entry.push(doc);
        }
    }

    pub(crate) fn all(&self, collection: &str) -> Vec<Document> {
        let guard = self.collections.lock().expect("collections mutex poisoned");
        guard.get(collection).cloned().unwrap_or_default()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self) -> CoreResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(CoreError::Store("store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for RecordingStore {
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> CoreResult<Vec<Document>> {
        self.enter()?;
        self.finds
            .lock()
            .expect("finds mutex poisoned")
            .push((collection.to_string(), filter.clone(), options.clone()));
        let guard = self.collections.lock().expect("collections mutex poisoned");
        let docs = guard.get(collection).map(Vec::as_slice).unwrap_or_default();
        Ok(apply_find(docs, filter, options))
    }

    async fn count_documents(&self, collection: &str, filter: &Filter) -> CoreResult<u64> {
        self.enter()?;
        self.counts
            .lock()
            .expect("counts mutex poisoned")
            .push((collection.to_string(), filter.clone()));
        let guard = self.collections.lock().expect("collections mutex poisoned");
        let docs = guard.get(collection).map(Vec::as_slice).unwrap_or_default();
        Ok(docs.iter().filter(|d| filter.matches(d)).count() as u64)
    }

    async fn insert_one(&self, collection: &str, mut document: Document) -> CoreResult<InsertOneResult> {
        self.enter()?;
        let id = ensure_id(&mut document);
        let mut guard = self.collections.lock().expect("collections mutex poisoned");
        let entry = guard.entry(collection.to_string()).or_default();
        if entry.iter().any(|d| d.get(ID_FIELD) == Some(&id)) {
            return Err(CoreError::DuplicateKey(id_key(&id)));
        }
        entry.push(document);
        Ok(InsertOneResult {
            acknowledged: true,
            inserted_id: id,
        })
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> CoreResult<DeleteResult> {
        self.enter()?;
        let mut guard = self.collections.lock().expect("collections mutex poisoned");
        let entry = guard.entry(collection.to_string()).or_default();
        let deleted_count = match entry.iter().position(|d| filter.matches(d)) {
            Some(index) => {
                entry.remove(index);
                1
            }
            None => 0,
        };
        Ok(DeleteResult {
            acknowledged: true,
            deleted_count,
        })
    }
}
