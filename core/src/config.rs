// bobabble/src/config.rs

//! Remote store configuration, loaded once at process entry and passed down
//! explicitly (see `store::Backend::from_config`).

use dotenvy::dotenv;
use std::env;

pub const STORE_URL_VAR: &str = "BOBABBLE_STORE_URL";
pub const STORE_ANON_KEY_VAR: &str = "BOBABBLE_STORE_ANON_KEY";

// Values shipped in the project's `.env.example`; treated the same as "unset".
const PLACEHOLDER_URL: &str = "https://your-project-id.supabase.co";
const PLACEHOLDER_ANON_KEY: &str = "your_supabase_anon_key_here";

#[derive(Clone, Default)]
pub struct StoreConfig {
  pub url: Option<String>,
  pub anon_key: Option<String>,
}

impl StoreConfig {
  pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
    Self {
      url: Some(url.into()),
      anon_key: Some(anon_key.into()),
    }
  }

  /// Reads the store endpoint and key from the environment (after loading `.env`).
  /// Missing variables are not an error: the storefront runs in demo mode.
  pub fn from_env() -> Self {
    dotenv().ok();

    let read = |var_name: &str| env::var(var_name).ok().map(|v| v.trim().to_string());
    let config = Self {
      url: read(STORE_URL_VAR),
      anon_key: read(STORE_ANON_KEY_VAR),
    };

    if config.is_configured() {
      tracing::info!("Remote store configuration loaded.");
    } else {
      tracing::warn!(
        "Remote store is not configured ({} / {}); catalog reads will use built-in data and orders are disabled.",
        STORE_URL_VAR,
        STORE_ANON_KEY_VAR
      );
    }
    config
  }

  pub fn is_configured(&self) -> bool {
    match (self.url.as_deref(), self.anon_key.as_deref()) {
      (Some(url), Some(key)) => {
        !url.is_empty() && !key.is_empty() && url != PLACEHOLDER_URL && key != PLACEHOLDER_ANON_KEY
      }
      _ => false,
    }
  }
}

// The anon key never goes to logs.
impl std::fmt::Debug for StoreConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StoreConfig")
      .field("url", &self.url)
      .field("anon_key", &self.anon_key.as_ref().map(|_| "[REDACTED]"))
      .finish()
  }
}
