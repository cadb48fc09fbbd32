//! HTTP route handlers. Each handler validates its input shape, calls exactly
//! one gateway operation, and returns the `{status, payload|error}` envelope;
//! status mapping happens centrally in [`crate::error`].

pub mod auth;
pub mod carts;
pub mod products;
pub mod tickets;
pub mod views;

use axum_extra::extract::cookie::CookieJar;

use {tienda_auth::Identity, tienda_sessions::verify_cookie};

use crate::{error::ApiError, server::AppState};

/// Resolve the identity behind the request's session cookie, if any.
pub(crate) async fn current_identity(
    state: &AppState,
    jar: &CookieJar,
) -> Result<Option<Identity>, ApiError> {
    let Some(cookie) = jar.get(tienda_sessions::SESSION_COOKIE) else {
        return Ok(None);
    };
    let Some(session_id) = verify_cookie(cookie.value(), &state.bridge.session_secret) else {
        return Ok(None);
    };
    Ok(state.bridge.gateways.auth.attach(&session_id).await?)
}

/// Like [`current_identity`] but requires a live session.
pub(crate) async fn require_identity(
    state: &AppState,
    jar: &CookieJar,
) -> Result<Identity, ApiError> {
    current_identity(state, jar)
        .await?
        .ok_or(ApiError::Auth(tienda_auth::AuthError::InvalidCredentials))
}
