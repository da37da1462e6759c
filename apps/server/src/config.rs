//! Server configuration.
//!
//! Configuration is loaded from `BILLMASTER_*` environment variables with
//! fallback to defaults.

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use serde::Serialize;
use tracing::warn;

/// Signing secret used when `BILLMASTER_SECRET` is unset. Only fit for
/// local development.
pub const DEV_SECRET: &str = "billmaster-dev-secret-change-in-production";

/// Longest accepted session lifetime: one year.
pub const MAX_SESSION_SECS: i64 = 365 * 24 * 60 * 60;

/// Server configuration.
#[derive(Debug, Clone, Serialize)]
pub struct ServerConfig {
    /// Bind address
    pub host: IpAddr,

    /// Bind port
    pub port: u16,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Secret for signing session tokens
    #[serde(skip_serializing)]
    pub session_secret: String,

    /// Session lifetime in seconds
    pub session_lifetime_secs: i64,

    /// Seed demo data into an empty database on startup
    pub seed_demo_data: bool,

    /// Mark the session cookie `Secure` (HTTPS deployments)
    pub cookie_secure: bool,

    /// Default tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let session_secret = match lookup("BILLMASTER_SECRET") {
            Some(secret) if !secret.trim().is_empty() => secret,
            _ => {
                warn!("BILLMASTER_SECRET is not set, using the development secret");
                DEV_SECRET.to_string()
            }
        };

        let config = ServerConfig {
            host: var("BILLMASTER_HOST", "0.0.0.0")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("BILLMASTER_HOST".to_string()))?,

            port: var("BILLMASTER_PORT", "5000")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("BILLMASTER_PORT".to_string()))?,

            database_path: PathBuf::from(var("BILLMASTER_DB", "./billmaster.db")),

            session_secret,

            session_lifetime_secs: var("BILLMASTER_SESSION_SECS", "86400") // 1 day
                .parse()
                .map_err(|_| ConfigError::InvalidValue("BILLMASTER_SESSION_SECS".to_string()))?,

            seed_demo_data: parse_flag(&var("BILLMASTER_SEED", "false"))
                .ok_or_else(|| ConfigError::InvalidValue("BILLMASTER_SEED".to_string()))?,

            cookie_secure: parse_flag(&var("BILLMASTER_COOKIE_SECURE", "false"))
                .ok_or_else(|| ConfigError::InvalidValue("BILLMASTER_COOKIE_SECURE".to_string()))?,

            log_filter: var("RUST_LOG", "info"),
        };

        if !(1..=MAX_SESSION_SECS).contains(&config.session_lifetime_secs) {
            return Err(ConfigError::InvalidValue("BILLMASTER_SESSION_SECS".to_string()));
        }

        Ok(config)
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.port, 5000);
        assert_eq!(config.bind_addr().to_string(), "0.0.0.0:5000");
        assert_eq!(config.database_path, PathBuf::from("./billmaster.db"));
        assert_eq!(config.session_secret, DEV_SECRET);
        assert_eq!(config.session_lifetime_secs, 86400);
        assert!(!config.seed_demo_data);
        assert!(!config.cookie_secure);
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("BILLMASTER_HOST", "127.0.0.1"),
            ("BILLMASTER_PORT", "8080"),
            ("BILLMASTER_SECRET", "s3cret"),
            ("BILLMASTER_SEED", "yes"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr().to_string(), "127.0.0.1:8080");
        assert_eq!(config.session_secret, "s3cret");
        assert!(config.seed_demo_data);
    }

    #[test]
    fn test_invalid_values() {
        assert!(ServerConfig::from_lookup(lookup(&[("BILLMASTER_PORT", "http")])).is_err());
        assert!(ServerConfig::from_lookup(lookup(&[("BILLMASTER_SEED", "maybe")])).is_err());
        assert!(ServerConfig::from_lookup(lookup(&[("BILLMASTER_SESSION_SECS", "0")])).is_err());
    }

    #[test]
    fn test_session_lifetime_ceiling() {
        let year = MAX_SESSION_SECS.to_string();
        let config = ServerConfig::from_lookup(lookup(&[("BILLMASTER_SESSION_SECS", &year)])).unwrap();
        assert_eq!(config.session_lifetime_secs, MAX_SESSION_SECS);

        let too_long = (MAX_SESSION_SECS + 1).to_string();
        assert!(ServerConfig::from_lookup(lookup(&[("BILLMASTER_SESSION_SECS", &too_long)])).is_err());

        let huge = (i64::MAX / 1000).to_string();
        assert!(matches!(
            ServerConfig::from_lookup(lookup(&[("BILLMASTER_SESSION_SECS", &huge)])),
            Err(ConfigError::InvalidValue(ref key)) if key == "BILLMASTER_SESSION_SECS"
        ));
    }
}
