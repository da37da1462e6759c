//! Dashboard and report aggregates. All read-only.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;

use billmaster_db::SummaryPeriod;

use crate::auth::Session;
use crate::error::ApiResult;
use crate::extract::Params;
use crate::routes::{ok, today};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/analytics/dashboard", get(dashboard))
        .route("/api/analytics/sales-chart", get(sales_chart))
        .route("/api/analytics/payment-methods", get(payment_methods))
        .route("/api/analytics/top-products", get(top_products))
        .route("/api/analytics/low-stock", get(low_stock))
        .route("/api/analytics/hourly-sales", get(hourly_sales))
        .route("/api/analytics/recent-invoices", get(recent_invoices))
        .route("/api/analytics/monthly", get(monthly))
        .route("/api/analytics/customer-stats", get(customer_stats))
        .route("/api/analytics/summary", get(summary))
}

/// Optional knobs shared by the report endpoints.
#[derive(Debug, Default, Deserialize)]
struct ReportQuery {
    days: Option<u32>,
    limit: Option<u32>,
    threshold: Option<i64>,
    months: Option<u32>,
    period: Option<String>,
}

async fn dashboard(State(state): State<AppState>, _session: Session) -> ApiResult<Json<Value>> {
    Ok(ok(state.db.analytics().dashboard(today()).await?))
}

async fn sales_chart(
    State(state): State<AppState>,
    _session: Session,
    Params(q): Params<ReportQuery>,
) -> ApiResult<Json<Value>> {
    let days = q.days.unwrap_or(7);
    Ok(ok(state.db.analytics().sales_chart(today(), days).await?))
}

async fn payment_methods(State(state): State<AppState>, _session: Session) -> ApiResult<Json<Value>> {
    Ok(ok(state.db.analytics().payment_methods(today()).await?))
}

async fn top_products(
    State(state): State<AppState>,
    _session: Session,
    Params(q): Params<ReportQuery>,
) -> ApiResult<Json<Value>> {
    let limit = q.limit.unwrap_or(5);
    let days = q.days.unwrap_or(30);
    Ok(ok(state.db.analytics().top_products(today(), limit, days).await?))
}

async fn low_stock(
    State(state): State<AppState>,
    _session: Session,
    Params(q): Params<ReportQuery>,
) -> ApiResult<Json<Value>> {
    Ok(ok(state.db.analytics().low_stock(q.threshold.unwrap_or(10)).await?))
}

async fn hourly_sales(State(state): State<AppState>, _session: Session) -> ApiResult<Json<Value>> {
    Ok(ok(state.db.analytics().hourly_sales(today()).await?))
}

async fn recent_invoices(
    State(state): State<AppState>,
    _session: Session,
    Params(q): Params<ReportQuery>,
) -> ApiResult<Json<Value>> {
    Ok(ok(state.db.analytics().recent_invoices(q.limit.unwrap_or(10)).await?))
}

async fn monthly(
    State(state): State<AppState>,
    _session: Session,
    Params(q): Params<ReportQuery>,
) -> ApiResult<Json<Value>> {
    let months = q.months.unwrap_or(6);
    Ok(ok(state.db.analytics().monthly(today(), months).await?))
}

async fn customer_stats(
    State(state): State<AppState>,
    _session: Session,
    Params(q): Params<ReportQuery>,
) -> ApiResult<Json<Value>> {
    Ok(ok(state.db.analytics().customer_stats(q.limit.unwrap_or(5)).await?))
}

async fn summary(
    State(state): State<AppState>,
    _session: Session,
    Params(q): Params<ReportQuery>,
) -> ApiResult<Json<Value>> {
    let period: SummaryPeriod = q.period.as_deref().unwrap_or("today").parse()?;
    Ok(ok(state.db.analytics().summary(today(), period).await?))
}
