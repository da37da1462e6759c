//! Customer endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use billmaster_core::{CustomerUpdate, NewCustomer};

use crate::auth::Session;
use crate::error::ApiResult;
use crate::extract::{Params, Payload};
use crate::routes::{created, ok, ok_message, ok_with_message};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/customers", get(list).post(create))
        .route("/api/customers/{id}", get(fetch).put(update).delete(remove))
}

#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    search: Option<String>,
}

async fn list(
    State(state): State<AppState>,
    _session: Session,
    Params(query): Params<ListQuery>,
) -> ApiResult<Json<Value>> {
    Ok(ok(state.db.customers().list(query.search.as_deref()).await?))
}

/// Customer with their ten most recent invoices.
async fn fetch(State(state): State<AppState>, _session: Session, Path(id): Path<i64>) -> ApiResult<Json<Value>> {
    Ok(ok(state.db.customers().get_detail(id).await?))
}

async fn create(
    State(state): State<AppState>,
    _session: Session,
    Payload(new_customer): Payload<NewCustomer>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let customer = state.db.customers().create(&new_customer).await?;
    Ok(created("Customer created", customer))
}

async fn update(
    State(state): State<AppState>,
    _session: Session,
    Path(id): Path<i64>,
    Payload(changes): Payload<CustomerUpdate>,
) -> ApiResult<Json<Value>> {
    let customer = state.db.customers().update(id, &changes).await?;
    Ok(ok_with_message("Customer updated", customer))
}

async fn remove(State(state): State<AppState>, session: Session, Path(id): Path<i64>) -> ApiResult<Json<Value>> {
    state.db.customers().delete(id).await?;
    info!(customer_id = id, user_id = session.user_id, "Customer deleted");
    Ok(ok_message("Customer deleted"))
}
