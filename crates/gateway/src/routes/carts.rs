use {
    axum::{
        Json, Router,
        extract::{Path, State},
        routing::{delete, post},
    },
    serde::Deserialize,
};

use tienda_protocol::Envelope;

use crate::{error::ApiError, server::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/{id}", delete(remove).get(get_one))
        .route(
            "/{cart_id}/products/{product_id}",
            post(add_item).put(set_quantity).delete(remove_item),
        )
}

#[derive(Debug, Deserialize)]
struct QuantityBody {
    quantity: Option<i64>,
}

async fn create(State(state): State<AppState>) -> Result<Json<Envelope>, ApiError> {
    let cart = state.bridge.gateways.carts.create().await?;
    Ok(Json(Envelope::success(cart)))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope>, ApiError> {
    let cart = state.bridge.gateways.carts.get(&id).await?;
    Ok(Json(Envelope::success(cart)))
}

async fn add_item(
    State(state): State<AppState>,
    Path((cart_id, product_id)): Path<(String, String)>,
    body: Option<Json<QuantityBody>>,
) -> Result<Json<Envelope>, ApiError> {
    let quantity = body.and_then(|b| b.quantity).unwrap_or(1);
    let cart = state
        .bridge
        .gateways
        .carts
        .add_item(&cart_id, &product_id, quantity)
        .await?;
    Ok(Json(Envelope::success(cart)))
}

async fn set_quantity(
    State(state): State<AppState>,
    Path((cart_id, product_id)): Path<(String, String)>,
    Json(body): Json<QuantityBody>,
) -> Result<Json<Envelope>, ApiError> {
    let quantity = body
        .quantity
        .ok_or_else(|| ApiError::BadRequest("quantity is required".into()))?;
    let cart = state
        .bridge
        .gateways
        .carts
        .set_quantity(&cart_id, &product_id, quantity)
        .await?;
    Ok(Json(Envelope::success(cart)))
}

async fn remove_item(
    State(state): State<AppState>,
    Path((cart_id, product_id)): Path<(String, String)>,
) -> Result<Json<Envelope>, ApiError> {
    let cart = state
        .bridge
        .gateways
        .carts
        .remove_item(&cart_id, &product_id)
        .await?;
    Ok(Json(Envelope::success(cart)))
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope>, ApiError> {
    state.bridge.gateways.carts.delete(&id).await?;
    Ok(Json(Envelope::success(serde_json::json!({ "deleted": id }))))
}
