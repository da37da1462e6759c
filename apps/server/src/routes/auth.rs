//! Login, logout, session check, user registration and password change.

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use billmaster_core::NewUser;
use billmaster_db::password::verify_password;

use crate::auth::{AdminSession, Session};
use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::extract::Payload;
use crate::routes::{created, ok_message};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/check", get(check))
        .route("/api/auth/register", post(register))
        .route("/api/auth/password", put(change_password))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

fn set_cookie(value: String) -> ApiResult<HeaderValue> {
    HeaderValue::from_str(&value).map_err(|_| ApiError::internal())
}

async fn login(State(state): State<AppState>, Payload(req): Payload<LoginRequest>) -> ApiResult<Response> {
    let username = req.username.trim();
    if username.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Username and password are required"));
    }

    let credentials = state.db.users().find_by_username(username).await?;
    let user = match credentials {
        Some(user) if verify_password(&req.password, &user.password_hash) => user,
        _ => {
            warn!(username = %username, "Failed login attempt");
            return Err(ApiError::unauthorized("Invalid username or password"));
        }
    };

    let token = state
        .sessions
        .issue(user.id, &user.username, &user.full_name, user.role)?;
    let cookie = set_cookie(state.sessions.cookie(&token))?;

    info!(user_id = user.id, username = %user.username, "User logged in");

    let body = Json(json!({
        "success": true,
        "message": "Login successful",
        "user": {
            "id": user.id,
            "username": user.username,
            "full_name": user.full_name,
            "role": user.role,
        },
        "token": token,
    }));

    Ok(([(SET_COOKIE, cookie)], body).into_response())
}

async fn logout(State(state): State<AppState>) -> ApiResult<Response> {
    let cookie = set_cookie(state.sessions.clear_cookie())?;
    Ok(([(SET_COOKIE, cookie)], ok_message("Logged out")).into_response())
}

async fn check(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Json<Value>> {
    match Session::from_headers(&headers, &state).await {
        Ok(session) => Ok(Json(json!({ "success": true, "user": session }))),
        Err(err) if err.code == ErrorCode::Unauthorized => {
            Ok(Json(json!({ "success": false, "message": "Not logged in" })))
        }
        Err(err) => Err(err),
    }
}

async fn register(
    State(state): State<AppState>,
    AdminSession(admin): AdminSession,
    Payload(new_user): Payload<NewUser>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let user = state.db.users().create(&new_user).await?;
    info!(created_by = admin.user_id, user_id = user.id, username = %user.username, "User registered");
    Ok(created("User created", user))
}

#[derive(Debug, Deserialize)]
struct PasswordChange {
    current_password: String,
    new_password: String,
}

async fn change_password(
    State(state): State<AppState>,
    session: Session,
    Payload(req): Payload<PasswordChange>,
) -> ApiResult<Json<Value>> {
    let credentials = state
        .db
        .users()
        .find_by_username(&session.username)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Please login first"))?;

    if !verify_password(&req.current_password, &credentials.password_hash) {
        return Err(ApiError::bad_request("Current password is incorrect"));
    }

    state
        .db
        .users()
        .update_password(session.user_id, &req.new_password)
        .await?;

    info!(user_id = session.user_id, "Password changed");
    Ok(ok_message("Password updated"))
}
