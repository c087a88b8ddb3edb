use async_trait::async_trait;

use crate::document::Document;
use crate::query::{DeleteResult, Filter, FindOptions, InsertOneResult};
use crate::CoreResult;

pub const SERVICES_COLLECTION: &str = "services";
pub const BOOKINGS_COLLECTION: &str = "bookings";

/// Port for the document database backing services and bookings.
///
/// Each call is a single round trip to the store; callers never retry.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> CoreResult<Vec<Document>>;

    async fn count_documents(&self, collection: &str, filter: &Filter) -> CoreResult<u64>;

    /// Inserts the document, assigning `_id` when it is missing.
    async fn insert_one(&self, collection: &str, document: Document) -> CoreResult<InsertOneResult>;

    /// Deletes the first document matching the filter, in natural order.
    async fn delete_one(&self, collection: &str, filter: &Filter) -> CoreResult<DeleteResult>;
}
