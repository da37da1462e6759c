//! HTTP routes, one module per resource.
//!
//! ## Endpoints
//! ```text
//! /api/auth/*        login, logout, check, register, password
//! /api/products      CRUD + stock adjustment
//! /api/categories    CRUD
//! /api/customers     CRUD
//! /api/invoices      create, list, today, get, status
//! /api/analytics/*   dashboard and report aggregates
//! /api/settings      key/value settings, users, factory reset (admin)
//! /api/expenses      admin only
//! /health            liveness + database check
//! ```
//!
//! Every success body is `{"success": true, ...}`; failures go through
//! [`ApiError`](crate::error::ApiError).

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use serde_json::{json, Value};

use crate::state::AppState;

pub mod analytics;
pub mod auth;
pub mod categories;
pub mod customers;
pub mod expenses;
pub mod invoices;
pub mod products;
pub mod settings;

/// All `/api` routes plus `/health`.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(products::router())
        .merge(categories::router())
        .merge(customers::router())
        .merge(invoices::router())
        .merge(analytics::router())
        .merge(settings::router())
        .merge(expenses::router())
        .route("/health", get(health))
}

/// The server's local business day.
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// `{"success": true, "data": ...}`
pub(crate) fn ok<T: Serialize>(data: T) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}

/// `{"success": true, "message": ..., "data": ...}`
pub(crate) fn ok_with_message<T: Serialize>(message: &str, data: T) -> Json<Value> {
    Json(json!({ "success": true, "message": message, "data": data }))
}

/// `{"success": true, "message": ...}`
pub(crate) fn ok_message(message: &str) -> Json<Value> {
    Json(json!({ "success": true, "message": message }))
}

/// 201 with `{"success": true, "message": ..., "data": ...}`
pub(crate) fn created<T: Serialize>(message: &str, data: T) -> (StatusCode, Json<Value>) {
    (StatusCode::CREATED, ok_with_message(message, data))
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    if state.db.health_check().await {
        (StatusCode::OK, Json(json!({ "success": true, "status": "ok", "database": "ok" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "success": false, "status": "degraded", "database": "unreachable" })),
        )
    }
}
