//! Session tokens and the identity extractors.
//!
//! ## Flow
//! ```text
//! POST /api/auth/login ──► verify Argon2 hash ──► SessionManager::issue
//!                                                      │
//!                          Set-Cookie: billmaster_session=<JWT>; HttpOnly
//!                                                      │
//! GET /api/products ──► Session extractor ──► cookie or Bearer header
//!                            │                         │
//!                            │◄── verify signature + expiry, load user
//!                            ▼
//!                       handler(session: Session, ...)
//! ```
//!
//! A token is HS256-signed and carries the user's id, name and role. The
//! user row is re-read on every request, so a deleted account or a changed
//! role takes effect immediately.

use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use billmaster_core::Role;
use billmaster_db::DbError;

use crate::error::ApiError;
use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "billmaster_session";

const LOGIN_REQUIRED: &str = "Please login first";
const ADMIN_REQUIRED: &str = "Admin access required";

/// Session token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    pub username: String,

    pub full_name: String,

    pub role: Role,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// Token id
    pub jti: String,
}

/// Issues and verifies session tokens.
pub struct SessionManager {
    secret: String,
    lifetime_secs: i64,
    cookie_secure: bool,
}

impl SessionManager {
    pub fn new(secret: String, lifetime_secs: i64, cookie_secure: bool) -> Self {
        SessionManager {
            secret,
            lifetime_secs,
            cookie_secure,
        }
    }

    /// Signs a token for a logged-in user.
    pub fn issue(&self, user_id: i64, username: &str, full_name: &str, role: Role) -> Result<String, ApiError> {
        let now = Utc::now();
        let exp = Duration::try_seconds(self.lifetime_secs)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                tracing::error!(lifetime_secs = self.lifetime_secs, "Session lifetime out of range");
                ApiError::internal()
            })?;

        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            full_name: full_name.to_string(),
            role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to sign session token");
            ApiError::internal()
        })
    }

    /// Checks signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!(error = %e, "Rejected session token");
            ApiError::unauthorized(LOGIN_REQUIRED)
        })
    }

    /// `Set-Cookie` value carrying a fresh token.
    pub fn cookie(&self, token: &str) -> String {
        self.cookie_with(token, self.lifetime_secs)
    }

    /// `Set-Cookie` value that removes the session cookie.
    pub fn clear_cookie(&self) -> String {
        self.cookie_with("", 0)
    }

    fn cookie_with(&self, value: &str, max_age: i64) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            SESSION_COOKIE, value, max_age
        );
        if self.cookie_secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Finds the session token in the cookie jar or an `Authorization: Bearer`
/// header, in that order.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    let from_cookie = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().strip_prefix(SESSION_COOKIE)?.strip_prefix('='))
        .find(|token| !token.is_empty());

    from_cookie.or_else(|| {
        headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(extract_bearer_token)
    })
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ").map(str::trim).filter(|t| !t.is_empty())
}

// =============================================================================
// Extractors
// =============================================================================

/// The authenticated user making the request.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    #[serde(rename = "id")]
    pub user_id: i64,
    pub username: String,
    pub full_name: String,
    pub role: Role,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Resolves the session for a set of request headers.
    pub async fn from_headers(headers: &HeaderMap, state: &AppState) -> Result<Session, ApiError> {
        let token = session_token(headers).ok_or_else(|| ApiError::unauthorized(LOGIN_REQUIRED))?;
        let claims = state.sessions.verify(token)?;
        let user_id: i64 = claims
            .sub
            .parse()
            .map_err(|_| ApiError::unauthorized(LOGIN_REQUIRED))?;

        match state.db.users().get(user_id).await {
            Ok(user) => Ok(Session {
                user_id: user.id,
                username: user.username,
                full_name: user.full_name,
                role: user.role,
            }),
            Err(DbError::NotFound { .. }) => Err(ApiError::unauthorized(LOGIN_REQUIRED)),
            Err(e) => Err(e.into()),
        }
    }
}

impl FromRequestParts<AppState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Session::from_headers(&parts.headers, state).await
    }
}

/// A session whose user has the admin role.
#[derive(Debug, Clone)]
pub struct AdminSession(pub Session);

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = Session::from_headers(&parts.headers, state).await?;
        if !session.is_admin() {
            return Err(ApiError::forbidden(ADMIN_REQUIRED));
        }
        Ok(AdminSession(session))
    }
}
