use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use cleanco_core::validation::{PassThrough, PayloadValidator};
use cleanco_core::Document;
use serde::Serialize;
use tracing::debug;

use crate::{error::AppError, middleware::TOKEN_COOKIE, state::AppState};

#[derive(Debug, Serialize)]
struct AccessTokenResponse {
    success: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/v1/auth/access-token", post(issue_access_token))
}

/// Signs whatever identity the client sends. No credential is checked.
async fn issue_access_token(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<Document>, JsonRejection>,
) -> Result<(CookieJar, Json<AccessTokenResponse>), AppError> {
    let identity = match body {
        Ok(Json(identity)) => identity,
        // A body sent without a JSON content type is read as an empty identity.
        Err(JsonRejection::MissingJsonContentType(_)) => Document::new(),
        Err(rejection) => return Err(rejection.into()),
    };
    debug!(?identity, "issuing access token");
    let identity = PassThrough.validate(identity)?;

    let token = state.signer().issue(identity, Utc::now().timestamp())?;

    // Session cookie: the JWT expiry is the only lifetime.
    let cookie = Cookie::build((TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None);

    Ok((jar.add(cookie), Json(AccessTokenResponse { success: true })))
}
