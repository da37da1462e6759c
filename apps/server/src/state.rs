//! Shared application state.

use std::sync::Arc;

use billmaster_db::Database;

use crate::auth::SessionManager;
use crate::config::ServerConfig;

/// Handed to every handler through `State<AppState>`. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub sessions: Arc<SessionManager>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(db: Database, config: ServerConfig) -> Self {
        let sessions = SessionManager::new(
            config.session_secret.clone(),
            config.session_lifetime_secs,
            config.cookie_secure,
        );

        AppState {
            db,
            sessions: Arc::new(sessions),
            config: Arc::new(config),
        }
    }
}
