//! Request layer configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the API client.
///
/// Loaded once at startup; the base URL is never hardcoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the REST API (e.g. "https://club.example.org/api").
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("clubhouse/", env!("CARGO_PKG_VERSION")).to_string()
}

impl ApiConfig {
    /// Creates a configuration with defaults for everything but the base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_seconds: default_timeout_seconds(),
            user_agent: default_user_agent(),
        }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_only_base_url_given() {
        let config: ApiConfig =
            serde_json::from_str(r#"{"base_url": "http://localhost:8080"}"#).expect("parse");
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.user_agent.starts_with("clubhouse/"));
    }
}
