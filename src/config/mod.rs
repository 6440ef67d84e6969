//! Configuration module for the CastDeck backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key for API authentication (required in production)
    pub api_psk: Option<String>,
    /// Path to the JSON state snapshot file
    pub state_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Quiet period before a state snapshot is flushed to disk
    pub persist_debounce: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_psk = env::var("CASTDECK_API_PSK").ok();

        let state_path = env::var("CASTDECK_STATE_PATH")
            .unwrap_or_else(|_| "./data/state.json".to_string())
            .into();

        let bind_addr = env::var("CASTDECK_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8095".to_string())
            .parse()
            .expect("Invalid CASTDECK_BIND_ADDR format");

        let log_level = env::var("CASTDECK_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let persist_debounce = env::var("CASTDECK_PERSIST_DEBOUNCE_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_millis(750));

        Self {
            api_psk,
            state_path,
            bind_addr,
            log_level,
            persist_debounce,
        }
    }
}
