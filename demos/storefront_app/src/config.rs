// storefront_app/src/config.rs

use crate::errors::{AppError, Result};
use bobabble::{FallbackPolicy, StoreConfig};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  /// Remote store endpoint; unconfigured means demo mode.
  pub store: StoreConfig,
  pub catalog_fallback: FallbackPolicy,
  /// Sessions not seen for this long are dropped.
  pub session_idle_timeout: Duration,
  pub max_sessions: usize,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| env::var(var_name).ok().filter(|v| !v.trim().is_empty());

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let catalog_fallback = match get_env("CATALOG_FALLBACK") {
      Some(value) => value
        .parse::<FallbackPolicy>()
        .map_err(|e| AppError::Config(format!("Invalid CATALOG_FALLBACK: {}", e)))?,
      None => FallbackPolicy::default(),
    };

    let session_idle_timeout = get_env("SESSION_IDLE_SECS")
      .unwrap_or_else(|| "3600".to_string())
      .parse::<u64>()
      .map(Duration::from_secs)
      .map_err(|e| AppError::Config(format!("Invalid SESSION_IDLE_SECS: {}", e)))?;
    let max_sessions = get_env("MAX_SESSIONS")
      .unwrap_or_else(|| "10000".to_string())
      .parse::<usize>()
      .map_err(|e| AppError::Config(format!("Invalid MAX_SESSIONS: {}", e)))?;

    let store = StoreConfig::from_env();

    tracing::info!(
      server_host = %server_host,
      server_port,
      catalog_fallback = ?catalog_fallback,
      session_idle_secs = session_idle_timeout.as_secs(),
      max_sessions,
      store_configured = store.is_configured(),
      "Application configuration loaded successfully."
    );

    Ok(Self {
      server_host,
      server_port,
      store,
      catalog_fallback,
      session_idle_timeout,
      max_sessions,
    })
  }
}
