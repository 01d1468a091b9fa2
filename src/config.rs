//! Environment-driven settings.
//!
//! `.env` is loaded first (via `dotenvy`), then:
//!
//! - `MFAPI_BASE_URL`: NAV feed root (default `https://api.mfapi.in/mf`)
//! - `MFAPI_TIMEOUT_SECS`: per-request timeout (default 20)
//! - `NAV_LOG`: tracing filter for the CLI (default `warn`)

use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_BASE_URL: &str = "https://api.mfapi.in/mf";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let mut config = Self::default();

        if let Some(url) = lookup("MFAPI_BASE_URL").filter(|v| !v.trim().is_empty()) {
            config.base_url = url.trim().trim_end_matches('/').to_string();
        }

        if let Some(raw) = lookup("MFAPI_TIMEOUT_SECS") {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| AppError::new(2, format!("Invalid MFAPI_TIMEOUT_SECS '{raw}': expected whole seconds.")))?;
            if secs == 0 {
                return Err(AppError::new(2, "MFAPI_TIMEOUT_SECS must be > 0."));
            }
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(filter) = lookup("NAV_LOG").filter(|v| !v.trim().is_empty()) {
            config.log_filter = filter;
        }

        Ok(config)
    }
}
