use axum::{
    extract::{Path, State},
    middleware,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use cleanco_core::{BookingLedger, DeleteResult, Document, InsertOneResult};
use serde::Deserialize;

use crate::{
    error::AppError,
    extract::{AppJson, AppQuery},
    middleware::token_guard,
    session::SessionClaims,
    state::AppState,
};

/// Every `email` value in the query string, in order.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwnerQuery {
    email: Vec<String>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    // Only the owner listing is guarded. Create and cancel stay open.
    let guarded = Router::new()
        .route("/api/v1/user/bookings", get(list_bookings))
        .route_layer(middleware::from_fn_with_state(state, token_guard));

    Router::new()
        .route("/api/v1/user/create-booking", post(create_booking))
        .route("/api/v1/user/cancel-booking/{booking_id}", delete(cancel_booking))
        .merge(guarded)
}

/// POST /api/v1/user/create-booking
async fn create_booking(
    State(state): State<AppState>,
    AppJson(booking): AppJson<Document>,
) -> Result<Json<InsertOneResult>, AppError> {
    let result = BookingLedger::new(state.store.clone()).create(booking).await?;
    Ok(Json(result))
}

/// GET /api/v1/user/bookings?email
async fn list_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    AppQuery(query): AppQuery<OwnerQuery>,
) -> Result<Json<Vec<Document>>, AppError> {
    let bookings = BookingLedger::new(state.store.clone())
        .list_for_owner(&query.email, claims.email())
        .await?;
    Ok(Json(bookings))
}

/// DELETE /api/v1/user/cancel-booking/{booking_id}
async fn cancel_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<String>,
) -> Result<Json<DeleteResult>, AppError> {
    let result = BookingLedger::new(state.store.clone()).cancel(&booking_id).await?;
    Ok(Json(result))
}
