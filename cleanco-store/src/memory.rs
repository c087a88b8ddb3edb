use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use cleanco_core::document::{apply_find, ensure_id, id_key, Document, ID_FIELD};
use cleanco_core::{CoreError, CoreResult, DeleteResult, DocumentStore, Filter, FindOptions, InsertOneResult};
use tokio::sync::RwLock;
use tracing::info;

/// Process-local document store. Insertion order is natural order.
#[derive(Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends documents to a collection, assigning `_id` where missing.
    pub async fn seed(&self, collection: &str, documents: Vec<Document>) -> CoreResult<()> {
        for document in documents {
            self.insert_one(collection, document).await?;
        }
        Ok(())
    }

    /// Reads a JSON array of documents from disk and seeds the collection.
    pub async fn seed_from_file(&self, collection: &str, path: impl AsRef<Path>) -> CoreResult<usize> {
        let path = path.as_ref();
        let raw = tokio::fs::read(path)
            .await
            .map_err(|e| CoreError::Store(format!("failed to read {}: {}", path.display(), e)))?;
        let documents: Vec<Document> = serde_json::from_slice(&raw)
            .map_err(|e| CoreError::Validation(format!("invalid seed file {}: {}", path.display(), e)))?;

        let count = documents.len();
        self.seed(collection, documents).await?;
        info!(collection, count, path = %path.display(), "seeded in-memory collection");
        Ok(count)
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> CoreResult<Vec<Document>> {
        let collections = self.collections.read().await;
        let documents = collections.get(collection).map(Vec::as_slice).unwrap_or_default();
        Ok(apply_find(documents, filter, options))
    }

    async fn count_documents(&self, collection: &str, filter: &Filter) -> CoreResult<u64> {
        let collections = self.collections.read().await;
        let count = collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).count())
            .unwrap_or(0);
        Ok(count as u64)
    }

    async fn insert_one(&self, collection: &str, mut document: Document) -> CoreResult<InsertOneResult> {
        let id = ensure_id(&mut document);
        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection.to_string()).or_default();

        if documents.iter().any(|d| d.get(ID_FIELD) == Some(&id)) {
            return Err(CoreError::DuplicateKey(id_key(&id)));
        }
        documents.push(document);

        Ok(InsertOneResult {
            acknowledged: true,
            inserted_id: id,
        })
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> CoreResult<DeleteResult> {
        let mut collections = self.collections.write().await;
        let position = collections
            .get(collection)
            .and_then(|docs| docs.iter().position(|d| filter.matches(d)));

        let deleted_count = match (position, collections.get_mut(collection)) {
            (Some(index), Some(documents)) => {
                documents.remove(index);
                1
            }
            _ => 0,
        };

        Ok(DeleteResult {
            acknowledged: true,
            deleted_count,
        })
    }
}
