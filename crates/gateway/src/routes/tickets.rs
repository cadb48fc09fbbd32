use {
    axum::{
        Json, Router,
        extract::{Path, State},
        routing::{get, post},
    },
    axum_extra::extract::cookie::CookieJar,
    serde::Deserialize,
};

use {tienda_auth::AuthError, tienda_protocol::Envelope};

use crate::{
    error::ApiError,
    routes::require_identity,
    server::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(checkout).get(list_mine))
        .route("/{id}", get(get_one))
}

#[derive(Debug, Deserialize)]
struct CheckoutBody {
    cart_id: String,
}

/// Turn a cart into a ticket at current catalog prices, then drop the cart.
async fn checkout(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<CheckoutBody>,
) -> Result<Json<Envelope>, ApiError> {
    let identity = require_identity(&state, &jar).await?;
    let gateways = &state.bridge.gateways;
    let cart = gateways.carts.get(&body.cart_id).await?;
    if cart.items.is_empty() {
        return Err(ApiError::BadRequest("cart is empty".into()));
    }
    let amount = gateways.carts.total(&cart.id).await?;
    let ticket = gateways.tickets.create(&identity.email, amount).await?;
    gateways.carts.delete(&cart.id).await?;
    Ok(Json(Envelope::success(ticket)))
}

async fn list_mine(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<Envelope>, ApiError> {
    let identity = require_identity(&state, &jar).await?;
    let tickets = state
        .bridge
        .gateways
        .tickets
        .list_for(&identity.email)
        .await?;
    Ok(Json(Envelope::success(tickets)))
}

async fn get_one(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Result<Json<Envelope>, ApiError> {
    let identity = require_identity(&state, &jar).await?;
    let ticket = state.bridge.gateways.tickets.get(&id).await?;
    if ticket.purchaser != identity.email && !identity.is_admin() {
        return Err(ApiError::Auth(AuthError::Forbidden));
    }
    Ok(Json(Envelope::success(ticket)))
}
