use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::document::Document;
use crate::query::{Filter, FindOptions, Pagination, SortOrder, SortSpec};
use crate::repository::{DocumentStore, SERVICES_COLLECTION};
use crate::CoreResult;

/// Raw catalog query parameters. Every field is optional and kept as text
/// so coercion happens in one visible place.
#[derive(Debug, Clone, Default)]
pub struct ServiceQuery {
    pub category: Option<String>,
    pub sort_field: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Store request built from a `ServiceQuery`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceSearch {
    pub filter: Filter,
    pub options: FindOptions,
}

impl ServiceQuery {
    pub fn search(&self) -> ServiceSearch {
        let mut filter = Filter::new();
        if let Some(category) = non_empty(&self.category) {
            filter = filter.eq("category", category);
        }

        let sort = match (non_empty(&self.sort_field), non_empty(&self.sort_order)) {
            (Some(field), Some(token)) => SortOrder::parse(token).map(|order| SortSpec {
                field: field.to_string(),
                order,
            }),
            _ => None,
        };

        let pagination = Pagination::from_params(self.page.as_deref(), self.limit.as_deref());

        ServiceSearch {
            filter,
            options: FindOptions {
                sort,
                skip: pagination.skip,
                limit: pagination.limit,
            },
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceListing {
    /// Size of the whole catalog, regardless of filter or page.
    pub total_services: u64,
    pub result: Vec<Document>,
}

pub struct ServiceCatalog {
    store: Arc<dyn DocumentStore>,
}

impl ServiceCatalog {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, query: &ServiceQuery) -> CoreResult<ServiceListing> {
        let search = query.search();
        debug!(?search, "listing services");

        let result = self
            .store
            .find(SERVICES_COLLECTION, &search.filter, &search.options)
            .await?;
        let total_services = self
            .store
            .count_documents(SERVICES_COLLECTION, &Filter::new())
            .await?;

        Ok(ServiceListing {
            total_services,
            result,
        })
    }
}
