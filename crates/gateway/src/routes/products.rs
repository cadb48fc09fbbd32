use {
    axum::{
        Json, Router,
        extract::{Path, Query, State},
        routing::get,
    },
    serde::Deserialize,
};

use {
    tienda_protocol::{Envelope, ProductDraft, ProductPatch},
    tienda_store::{ListFilter, PageQuery, PriceSort},
};

use crate::{error::ApiError, server::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update).delete(remove))
}

#[derive(Debug, Deserialize)]
struct ListParams {
    limit: Option<u32>,
    page: Option<u32>,
    sort: Option<PriceSort>,
    category: Option<String>,
    available: Option<bool>,
}

async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Envelope>, ApiError> {
    let filter = ListFilter {
        category: params.category,
        available: params.available,
    };
    let page = PageQuery {
        limit: params.limit.unwrap_or(PageQuery::default().limit),
        page: params.page.unwrap_or(1),
        sort: params.sort,
    };
    let result = state.bridge.gateways.catalog.list(&filter, &page).await?;
    Ok(Json(Envelope::success(result)))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope>, ApiError> {
    let product = state.bridge.gateways.catalog.get(&id).await?;
    Ok(Json(Envelope::success(product)))
}

async fn create(
    State(state): State<AppState>,
    Json(draft): Json<ProductDraft>,
) -> Result<Json<Envelope>, ApiError> {
    let product = state.bridge.gateways.catalog.create(draft).await?;
    Ok(Json(Envelope::success(product)))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<ProductPatch>,
) -> Result<Json<Envelope>, ApiError> {
    let product = state.bridge.gateways.catalog.update(&id, patch).await?;
    Ok(Json(Envelope::success(product)))
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope>, ApiError> {
    state.bridge.gateways.catalog.delete(&id).await?;
    Ok(Json(Envelope::success(serde_json::json!({ "deleted": id }))))
}
