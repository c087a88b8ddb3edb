use crate::document::Document;
use crate::CoreResult;

/// Stage every write payload goes through before it reaches the store or
/// the token signer.
pub trait PayloadValidator: Send + Sync {
    fn validate(&self, payload: Document) -> CoreResult<Document>;
}

/// Accepts any JSON object unchanged. Bookings and identity payloads carry
/// no schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl PayloadValidator for PassThrough {
    fn validate(&self, payload: Document) -> CoreResult<Document> {
        Ok(payload)
    }
}
