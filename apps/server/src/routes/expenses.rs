//! Expense endpoints (admin only).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde_json::Value;

use billmaster_core::NewExpense;

use crate::auth::AdminSession;
use crate::error::ApiResult;
use crate::extract::Payload;
use crate::routes::{created, ok, ok_message};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/expenses", get(list).post(create))
        .route("/api/expenses/{id}", delete(remove))
}

async fn list(State(state): State<AppState>, _admin: AdminSession) -> ApiResult<Json<Value>> {
    Ok(ok(state.db.expenses().list().await?))
}

async fn create(
    State(state): State<AppState>,
    _admin: AdminSession,
    Payload(new_expense): Payload<NewExpense>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let expense = state.db.expenses().create(&new_expense).await?;
    Ok(created("Expense recorded", expense))
}

async fn remove(State(state): State<AppState>, _admin: AdminSession, Path(id): Path<i64>) -> ApiResult<Json<Value>> {
    state.db.expenses().delete(id).await?;
    Ok(ok_message("Expense deleted"))
}
