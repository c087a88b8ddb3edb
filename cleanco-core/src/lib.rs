pub mod bookings;
pub mod document;
pub mod query;
pub mod repository;
pub mod services;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;

pub use bookings::BookingLedger;
pub use document::{Document, ID_FIELD};
pub use query::{DeleteResult, Filter, FindOptions, InsertOneResult, SortOrder, SortSpec};
pub use repository::{DocumentStore, BOOKINGS_COLLECTION, SERVICES_COLLECTION};
pub use services::{ServiceCatalog, ServiceListing, ServiceQuery};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),
    #[error("Store error: {0}")]
    Store(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
