//! Invoice endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use billmaster_core::{CartRequest, PaymentStatus};
use billmaster_db::InvoiceFilter;

use crate::auth::Session;
use crate::error::ApiResult;
use crate::extract::{Params, Payload};
use crate::routes::{ok, ok_message, today};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/invoices", get(list).post(create))
        .route("/api/invoices/today", get(today_summary))
        .route("/api/invoices/{id}", get(fetch))
        .route("/api/invoices/{id}/status", put(update_status))
}

#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    status: Option<PaymentStatus>,
    customer_id: Option<i64>,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
    limit: Option<i64>,
}

async fn list(
    State(state): State<AppState>,
    _session: Session,
    Params(query): Params<ListQuery>,
) -> ApiResult<Json<Value>> {
    let filter = InvoiceFilter {
        status: query.status,
        customer_id: query.customer_id,
        date_from: query.date_from,
        date_to: query.date_to,
        limit: query.limit,
    };
    Ok(ok(state.db.invoices().list(&filter).await?))
}

/// Issues an invoice for the cart, billed by the session user.
async fn create(
    State(state): State<AppState>,
    session: Session,
    Payload(cart): Payload<CartRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let created = state.db.invoices().create(&cart, Some(session.user_id)).await?;

    info!(
        invoice_id = created.invoice_id,
        invoice_number = %created.invoice_number,
        total_cents = created.total_cents,
        user_id = session.user_id,
        "Invoice created"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Invoice created",
            "invoice_id": created.invoice_id,
            "invoice_number": created.invoice_number,
            "data": created,
        })),
    ))
}

async fn today_summary(State(state): State<AppState>, _session: Session) -> ApiResult<Json<Value>> {
    Ok(ok(state.db.invoices().today_summary(today()).await?))
}

async fn fetch(State(state): State<AppState>, _session: Session, Path(id): Path<i64>) -> ApiResult<Json<Value>> {
    Ok(ok(state.db.invoices().get(id).await?))
}

#[derive(Debug, Deserialize)]
struct StatusChange {
    status: PaymentStatus,
}

async fn update_status(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
    Payload(change): Payload<StatusChange>,
) -> ApiResult<Json<Value>> {
    state.db.invoices().update_status(id, change.status).await?;
    info!(invoice_id = id, status = change.status.as_str(), user_id = session.user_id, "Invoice status updated");
    Ok(ok_message("Status updated"))
}
