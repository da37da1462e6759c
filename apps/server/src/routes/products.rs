//! Product catalogue endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use billmaster_core::{NewProduct, ProductUpdate, StockOperation};
use billmaster_db::ProductFilter;

use crate::auth::Session;
use crate::error::ApiResult;
use crate::extract::{Params, Payload};
use crate::routes::{created, ok, ok_message, ok_with_message};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list).post(create))
        .route("/api/products/{id}", get(fetch).put(update).delete(remove))
        .route("/api/products/{id}/stock", post(adjust_stock))
}

#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    category_id: Option<i64>,
    search: Option<String>,
    #[serde(default)]
    include_inactive: bool,
}

async fn list(
    State(state): State<AppState>,
    _session: Session,
    Params(query): Params<ListQuery>,
) -> ApiResult<Json<Value>> {
    let filter = ProductFilter {
        category_id: query.category_id,
        search: query.search,
        active_only: !query.include_inactive,
    };
    let products = state.db.products().list(&filter).await?;
    Ok(ok(products))
}

async fn fetch(State(state): State<AppState>, _session: Session, Path(id): Path<i64>) -> ApiResult<Json<Value>> {
    Ok(ok(state.db.products().get(id).await?))
}

async fn create(
    State(state): State<AppState>,
    session: Session,
    Payload(new_product): Payload<NewProduct>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let product = state.db.products().create(&new_product).await?;
    info!(product_id = product.id, user_id = session.user_id, "Product created");
    Ok(created("Product created", product))
}

async fn update(
    State(state): State<AppState>,
    _session: Session,
    Path(id): Path<i64>,
    Payload(changes): Payload<ProductUpdate>,
) -> ApiResult<Json<Value>> {
    let product = state.db.products().update(id, &changes).await?;
    Ok(ok_with_message("Product updated", product))
}

async fn remove(State(state): State<AppState>, session: Session, Path(id): Path<i64>) -> ApiResult<Json<Value>> {
    state.db.products().soft_delete(id).await?;
    info!(product_id = id, user_id = session.user_id, "Product deactivated");
    Ok(ok_message("Product deleted"))
}

#[derive(Debug, Deserialize)]
struct StockRequest {
    quantity: i64,
    #[serde(default)]
    operation: StockOperation,
}

async fn adjust_stock(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
    Payload(req): Payload<StockRequest>,
) -> ApiResult<Json<Value>> {
    let new_stock = state
        .db
        .products()
        .adjust_stock(id, req.quantity, req.operation)
        .await?;

    info!(product_id = id, operation = ?req.operation, quantity = req.quantity, new_stock, user_id = session.user_id, "Stock adjusted");

    Ok(Json(json!({
        "success": true,
        "message": "Stock updated",
        "new_stock": new_stock,
    })))
}
