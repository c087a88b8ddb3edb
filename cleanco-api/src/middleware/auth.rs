use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::error::AppError;
use crate::session::TokenError;
use crate::state::AppState;

pub const TOKEN_COOKIE: &str = "token";

// ============================================================================
// Token Guard
// ============================================================================

/// Admits the request only with a valid `token` cookie and hands the decoded
/// `SessionClaims` to the handler through request extensions.
pub async fn token_guard(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // 1. Extract token from cookie
    let jar = CookieJar::from_headers(req.headers());
    let token = jar
        .get(TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_owned())
        .ok_or(TokenError::Missing)?;

    // 2. Verify signature and expiry
    let claims = state.signer().verify(&token)?;

    // 3. Inject claims into request extensions
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
