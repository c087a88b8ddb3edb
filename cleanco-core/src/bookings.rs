use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::document::{Document, ID_FIELD};
use crate::query::{DeleteResult, Filter, FindOptions, InsertOneResult};
use crate::repository::{DocumentStore, BOOKINGS_COLLECTION};
use crate::validation::{PassThrough, PayloadValidator};
use crate::{CoreError, CoreResult};

/// Create, owner-scoped listing and cancellation of booking documents.
///
/// Only listing is owner-scoped. Creating and cancelling trust the caller.
pub struct BookingLedger {
    store: Arc<dyn DocumentStore>,
    validator: Box<dyn PayloadValidator>,
}

impl BookingLedger {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            validator: Box::new(PassThrough),
        }
    }

    pub fn with_validator(mut self, validator: impl PayloadValidator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    pub async fn create(&self, payload: Document) -> CoreResult<InsertOneResult> {
        let booking = self.validator.validate(payload)?;
        let result = self.store.insert_one(BOOKINGS_COLLECTION, booking).await?;
        info!(booking_id = %result.inserted_id, "booking created");
        Ok(result)
    }

    /// Lists bookings for the `email` query values, which must equal the
    /// caller's `email` claim. A repeated parameter is compared as an array,
    /// so it never matches a string claim. Both being absent counts as equal;
    /// an absent or empty email then lists every booking.
    pub async fn list_for_owner(
        &self,
        query_emails: &[String],
        claim_email: Option<&Value>,
    ) -> CoreResult<Vec<Document>> {
        let requested = match query_emails {
            [] => None,
            [email] => Some(Value::String(email.clone())),
            many => Some(Value::Array(many.iter().cloned().map(Value::String).collect())),
        };
        if requested.as_ref() != claim_email {
            debug!(?query_emails, ?claim_email, "booking owner mismatch");
            return Err(CoreError::Forbidden("forbidden access".to_string()));
        }

        let filter = match requested {
            Some(Value::String(email)) if email.is_empty() => Filter::new(),
            Some(email) => Filter::new().eq("email", email),
            None => Filter::new(),
        };

        self.store
            .find(BOOKINGS_COLLECTION, &filter, &FindOptions::default())
            .await
    }

    pub async fn cancel(&self, booking_id: &str) -> CoreResult<DeleteResult> {
        let filter = Filter::new().eq(ID_FIELD, booking_id);
        let result = self.store.delete_one(BOOKINGS_COLLECTION, &filter).await?;
        info!(%booking_id, deleted = result.deleted_count, "booking cancelled");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingStore;
    use serde_json::json;

    struct RejectAll;

    impl PayloadValidator for RejectAll {
        fn validate(&self, _payload: Document) -> CoreResult<Document> {
            Err(CoreError::Validation("rejected".to_string()))
        }
    }

    fn payload(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    fn emails(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn seeded() -> RecordingStore {
        let store = RecordingStore::new();
        store.seed(
            BOOKINGS_COLLECTION,
            vec![
                json!({"_id": "b-1", "email": "a@x.com", "service": "Carpet"}),
                json!({"_id": "b-2", "email": "b@x.com", "service": "Window"}),
                json!({"_id": "b-3", "email": "a@x.com", "service": "Kitchen"}),
            ],
        );
        store
    }

    #[tokio::test]
    async fn create_inserts_payload_verbatim_and_returns_new_id() {
        let store = RecordingStore::new();
        let ledger = BookingLedger::new(Arc::new(store.clone()));
        let booking = json!({"email": "a@x.com", "date": "2024-01-01", "extra": [1, 2]});

        let result = ledger.create(payload(booking.clone())).await.unwrap();

        assert!(result.acknowledged);
        let stored = store.all(BOOKINGS_COLLECTION);
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].get(ID_FIELD), Some(&result.inserted_id));
        let mut without_id = stored[0].clone();
        without_id.remove(ID_FIELD);
        assert_eq!(Value::Object(without_id), booking);
    }

    #[tokio::test]
    async fn create_does_not_require_an_owner() {
        let ledger = BookingLedger::new(Arc::new(RecordingStore::new()));

        let result = ledger.create(Document::new()).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn create_with_rejecting_validator_never_reaches_store() {
        let store = RecordingStore::new();
        let ledger = BookingLedger::new(Arc::new(store.clone())).with_validator(RejectAll);

        let result = ledger.create(payload(json!({"email": "a@x.com"}))).await;

        assert!(matches!(result, Err(CoreError::Validation(_))));
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn listing_returns_only_owner_bookings() {
        let ledger = BookingLedger::new(Arc::new(seeded()));
        let claim = json!("a@x.com");

        let bookings = ledger.list_for_owner(&emails(&["a@x.com"]), Some(&claim)).await.unwrap();

        let ids: Vec<_> = bookings.iter().map(|b| b[ID_FIELD].clone()).collect();
        assert_eq!(ids, vec![json!("b-1"), json!("b-3")]);
    }

    #[tokio::test]
    async fn listing_other_owner_is_forbidden_without_touching_store() {
        let store = seeded();
        let ledger = BookingLedger::new(Arc::new(store.clone()));
        let claim = json!("a@x.com");

        let result = ledger.list_for_owner(&emails(&["b@x.com"]), Some(&claim)).await;

        assert!(matches!(result, Err(CoreError::Forbidden(_))));
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn missing_query_email_against_email_claim_is_forbidden() {
        let ledger = BookingLedger::new(Arc::new(seeded()));
        let claim = json!("a@x.com");

        let result = ledger.list_for_owner(&[], Some(&claim)).await;

        assert!(matches!(result, Err(CoreError::Forbidden(_))));
    }

    #[tokio::test]
    async fn non_string_email_claim_never_matches_query() {
        let ledger = BookingLedger::new(Arc::new(seeded()));
        let claim = json!(42);

        let result = ledger.list_for_owner(&emails(&["42"]), Some(&claim)).await;

        assert!(matches!(result, Err(CoreError::Forbidden(_))));
    }

    #[tokio::test]
    async fn repeated_email_parameter_is_forbidden_even_when_one_matches() {
        let store = seeded();
        let ledger = BookingLedger::new(Arc::new(store.clone()));
        let claim = json!("a@x.com");

        let result = ledger
            .list_for_owner(&emails(&["a@x.com", "b@x.com"]), Some(&claim))
            .await;

        assert!(matches!(result, Err(CoreError::Forbidden(_))));
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn empty_email_matching_empty_claim_lists_every_booking() {
        let ledger = BookingLedger::new(Arc::new(seeded()));
        let claim = json!("");

        let bookings = ledger.list_for_owner(&emails(&[""]), Some(&claim)).await.unwrap();

        assert_eq!(bookings.len(), 3);
    }

    #[tokio::test]
    async fn absent_email_on_both_sides_lists_every_booking() {
        let ledger = BookingLedger::new(Arc::new(seeded()));

        let bookings = ledger.list_for_owner(&[], None).await.unwrap();

        assert_eq!(bookings.len(), 3);
    }

    #[tokio::test]
    async fn cancel_removes_booking_by_id() {
        let store = seeded();
        let ledger = BookingLedger::new(Arc::new(store.clone()));

        let result = ledger.cancel("b-2").await.unwrap();

        assert_eq!(result.deleted_count, 1);
        let remaining: Vec<_> = store
            .all(BOOKINGS_COLLECTION)
            .into_iter()
            .map(|b| b[ID_FIELD].clone())
            .collect();
        assert_eq!(remaining, vec![json!("b-1"), json!("b-3")]);
    }

    #[tokio::test]
    async fn cancel_unknown_id_acknowledges_zero_deletions() {
        let ledger = BookingLedger::new(Arc::new(seeded()));

        let result = ledger.cancel("missing").await.unwrap();

        assert!(result.acknowledged);
        assert_eq!(result.deleted_count, 0);
    }
}
