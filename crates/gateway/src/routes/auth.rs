use {
    axum::{Json, Router, extract::State, routing::{get, post}},
    axum_extra::extract::cookie::{Cookie, CookieJar},
    serde::Deserialize,
};

use {
    tienda_protocol::Envelope,
    tienda_sessions::{SESSION_COOKIE, sign_cookie, verify_cookie},
};

use crate::{error::ApiError, routes::current_identity, server::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/current", get(current))
}

#[derive(Debug, Deserialize)]
struct Credentials {
    email: String,
    password: String,
}

async fn register(
    State(state): State<AppState>,
    Json(body): Json<Credentials>,
) -> Result<Json<Envelope>, ApiError> {
    let identity = state
        .bridge
        .gateways
        .auth
        .register(&body.email, &body.password)
        .await?;
    Ok(Json(Envelope::success(identity)))
}

async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<Credentials>,
) -> Result<(CookieJar, Json<Envelope>), ApiError> {
    let (identity, session) = state
        .bridge
        .gateways
        .auth
        .login(&body.email, &body.password)
        .await?;
    let value = sign_cookie(&session.id, &state.bridge.session_secret)?;
    let cookie = Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .build();
    Ok((jar.add(cookie), Json(Envelope::success(identity))))
}

async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Envelope>), ApiError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE)
        && let Some(session_id) = verify_cookie(cookie.value(), &state.bridge.session_secret)
    {
        state.bridge.gateways.auth.logout(&session_id).await?;
    }
    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/").build());
    Ok((jar, Json(Envelope::success(serde_json::json!({ "loggedOut": true })))))
}

async fn current(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<Envelope>, ApiError> {
    match current_identity(&state, &jar).await? {
        Some(identity) => Ok(Json(Envelope::success(identity))),
        None => Err(ApiError::Auth(tienda_auth::AuthError::InvalidCredentials)),
    }
}
