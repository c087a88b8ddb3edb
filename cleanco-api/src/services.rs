use axum::{extract::State, middleware, routing::get, Json, Router};
use cleanco_core::{ServiceCatalog, ServiceListing, ServiceQuery};
use serde::Deserialize;

use crate::{error::AppError, extract::AppQuery, middleware::token_guard, state::AppState};

/// Catalog query string. Repeated keys keep their first value.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ServiceParams {
    category: Vec<String>,
    sort_field: Vec<String>,
    sort_order: Vec<String>,
    page: Vec<String>,
    limit: Vec<String>,
}

impl From<ServiceParams> for ServiceQuery {
    fn from(params: ServiceParams) -> Self {
        fn first(values: Vec<String>) -> Option<String> {
            values.into_iter().next()
        }

        ServiceQuery {
            category: first(params.category),
            sort_field: first(params.sort_field),
            sort_order: first(params.sort_order),
            page: first(params.page),
            limit: first(params.limit),
        }
    }
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/services", get(list_services))
        .route_layer(middleware::from_fn_with_state(state, token_guard))
}

/// GET /api/v1/services?category&sortField&sortOrder&page&limit
async fn list_services(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ServiceParams>,
) -> Result<Json<ServiceListing>, AppError> {
    let query = ServiceQuery::from(params);
    let listing = ServiceCatalog::new(state.store.clone()).list(&query).await?;
    Ok(Json(listing))
}
