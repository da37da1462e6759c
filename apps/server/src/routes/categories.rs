//! Category endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use tracing::info;

use billmaster_core::{CategoryUpdate, NewCategory};

use crate::auth::Session;
use crate::error::ApiResult;
use crate::extract::Payload;
use crate::routes::{created, ok, ok_message, ok_with_message};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/categories", get(list).post(create))
        .route("/api/categories/{id}", get(fetch).put(update).delete(remove))
}

/// Categories with their active product counts.
async fn list(State(state): State<AppState>, _session: Session) -> ApiResult<Json<Value>> {
    Ok(ok(state.db.categories().list().await?))
}

async fn fetch(State(state): State<AppState>, _session: Session, Path(id): Path<i64>) -> ApiResult<Json<Value>> {
    Ok(ok(state.db.categories().get(id).await?))
}

async fn create(
    State(state): State<AppState>,
    _session: Session,
    Payload(new_category): Payload<NewCategory>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let category = state.db.categories().create(&new_category).await?;
    Ok(created("Category created", category))
}

async fn update(
    State(state): State<AppState>,
    _session: Session,
    Path(id): Path<i64>,
    Payload(changes): Payload<CategoryUpdate>,
) -> ApiResult<Json<Value>> {
    let category = state.db.categories().update(id, &changes).await?;
    Ok(ok_with_message("Category updated", category))
}

async fn remove(State(state): State<AppState>, session: Session, Path(id): Path<i64>) -> ApiResult<Json<Value>> {
    state.db.categories().delete(id).await?;
    info!(category_id = id, user_id = session.user_id, "Category deleted");
    Ok(ok_message("Category deleted"))
}
