//! Configuration module for the UniUnity backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default admin password, hashed and stored by the startup seed when no
/// credential exists yet. Rotated through the config endpoint.
pub const DEFAULT_ADMIN_PASSWORD: &str = "UniUnity2025!";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Origin allowed by the CORS policy. None means permissive dev mode.
    pub allowed_origin: Option<String>,
    /// Session lifetime in seconds
    pub session_ttl_secs: i64,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let db_path = env::var("UNIUNITY_DB_PATH")
            .unwrap_or_else(|_| "./data/app.sqlite".to_string())
            .into();

        let bind_addr = env::var("UNIUNITY_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid UNIUNITY_BIND_ADDR format");

        let allowed_origin = env::var("UNIUNITY_ALLOWED_ORIGIN").ok();

        let session_ttl_secs = env::var("UNIUNITY_SESSION_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(24 * 60 * 60);

        let log_level = env::var("UNIUNITY_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            db_path,
            bind_addr,
            allowed_origin,
            session_ttl_secs,
            log_level,
        }
    }
}
