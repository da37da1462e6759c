//! Settings, user administration and factory reset.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::Value;
use tracing::{info, warn};

use crate::auth::{AdminSession, Session};
use crate::error::{ApiError, ApiResult};
use crate::extract::Payload;
use crate::routes::{ok, ok_message};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/settings", get(list).put(update))
        .route("/api/settings/users", get(list_users))
        .route("/api/settings/users/{id}", delete(delete_user))
        .route("/api/settings/factory-reset", post(factory_reset))
}

async fn list(State(state): State<AppState>, _session: Session) -> ApiResult<Json<Value>> {
    Ok(ok(state.db.settings().get_all().await?))
}

/// Accepts a flat JSON object. Numbers and booleans are stored as their
/// text form, `null` as an empty string.
async fn update(
    State(state): State<AppState>,
    AdminSession(admin): AdminSession,
    Payload(body): Payload<BTreeMap<String, Value>>,
) -> ApiResult<Json<Value>> {
    if body.is_empty() {
        return Err(ApiError::bad_request("No settings provided"));
    }

    let mut values = BTreeMap::new();
    for (key, value) in body {
        let text = match value {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => String::new(),
            Value::Array(_) | Value::Object(_) => {
                return Err(ApiError::bad_request(format!("Setting '{}' must be a scalar value", key)));
            }
        };
        values.insert(key, text);
    }

    state.db.settings().update(&values).await?;
    info!(user_id = admin.user_id, keys = ?values.keys().collect::<Vec<_>>(), "Settings updated");

    Ok(ok_message("Settings updated"))
}

async fn list_users(State(state): State<AppState>, _admin: AdminSession) -> ApiResult<Json<Value>> {
    Ok(ok(state.db.users().list().await?))
}

async fn delete_user(
    State(state): State<AppState>,
    AdminSession(admin): AdminSession,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    if id == admin.user_id {
        return Err(ApiError::bad_request("Cannot delete your own account"));
    }

    state.db.users().delete(id).await?;
    info!(user_id = id, deleted_by = admin.user_id, "User deleted");
    Ok(ok_message("User deleted"))
}

/// Wipes catalogue and transactions. Users and settings survive.
async fn factory_reset(State(state): State<AppState>, AdminSession(admin): AdminSession) -> ApiResult<Json<Value>> {
    warn!(user_id = admin.user_id, username = %admin.username, "Factory reset requested");
    state.db.settings().factory_reset().await?;
    Ok(ok_message("All data has been reset"))
}
