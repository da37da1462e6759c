//! # BillMaster Pro Server
//!
//! JSON HTTP API for the billing front end.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Request Pipeline                               │
//! │                                                                         │
//! │  HTTP ──► CorsLayer ──► TraceLayer ──► Router                           │
//! │                                          │                              │
//! │                          ┌───────────────┼────────────────┐             │
//! │                          ▼               ▼                ▼             │
//! │                     Session /      Payload / Params   State<AppState>   │
//! │                     AdminSession   (JSON, query)      (db, sessions)    │
//! │                          └───────────────┬────────────────┘             │
//! │                                          ▼                              │
//! │                                  handler ──► billmaster-db              │
//! │                                          │                              │
//! │                      {"success": true, ...} or ApiError envelope       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `BILLMASTER_HOST` / `BILLMASTER_PORT` - bind address (default: 0.0.0.0:5000)
//! - `BILLMASTER_DB` - SQLite file (default: ./billmaster.db)
//! - `BILLMASTER_SECRET` - session signing secret
//! - `BILLMASTER_SESSION_SECS` - session lifetime (default: 86400)
//! - `BILLMASTER_SEED` - seed demo data into an empty database
//! - `BILLMASTER_COOKIE_SECURE` - mark the session cookie `Secure`

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// Re-exports
pub use config::ServerConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use state::AppState;

/// Builds the application router with its middleware.
pub fn build_router(state: AppState) -> Router {
    routes::router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}
