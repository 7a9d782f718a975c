//! Console configuration.
//!
//! Loaded from environment variables prefixed with `CLUBHOUSE_`, using `__`
//! between nested keys:
//!
//! ```text
//! CLUBHOUSE_API__BASE_URL=https://club.example.org/api
//! CLUBHOUSE_API__TIMEOUT_SECONDS=10
//! CLUBHOUSE_STORAGE__PATH=/var/lib/clubhouse/session.json
//! CLUBHOUSE_SESSION__REVALIDATE_ON_START=true
//! CLUBHOUSE_GUARD__FALLBACK_PATH=/
//! ```

use clubhouse_access::RoleGuard;
use clubhouse_access::guard::{DEFAULT_FALLBACK_PATH, DEFAULT_LOGIN_PATH};
use clubhouse_api::ApiConfig;
use clubhouse_session::SessionConfig;
use serde::Deserialize;
use std::path::PathBuf;

/// Console configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ConsoleConfig {
    /// REST API settings.
    pub api: ApiConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub guard: GuardConfig,
}

/// Where durable credentials are kept.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("clubhouse-session.json")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

/// Redirect targets of the route guard.
#[derive(Debug, Clone, Deserialize)]
pub struct GuardConfig {
    #[serde(default = "default_login_path")]
    pub login_path: String,

    #[serde(default = "default_fallback_path")]
    pub fallback_path: String,
}

fn default_login_path() -> String {
    DEFAULT_LOGIN_PATH.to_string()
}

fn default_fallback_path() -> String {
    DEFAULT_FALLBACK_PATH.to_string()
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            login_path: default_login_path(),
            fallback_path: default_fallback_path(),
        }
    }
}

impl GuardConfig {
    #[must_use]
    pub fn guard(&self) -> RoleGuard {
        RoleGuard::new(self.login_path.clone(), self.fallback_path.clone())
    }
}

impl ConsoleConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `CLUBHOUSE_API__BASE_URL` is missing or a value
    /// has the wrong type.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_environment(environment())
    }

    fn from_environment(source: config::Environment) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("CLUBHOUSE")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn load(vars: &[(&str, &str)]) -> Result<ConsoleConfig, config::ConfigError> {
        let vars = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ConsoleConfig::from_environment(environment().source(Some(vars)))
    }

    #[test]
    fn nested_keys_and_defaults() {
        let config = load(&[
            ("CLUBHOUSE_API__BASE_URL", "https://club.example.org/api"),
            ("CLUBHOUSE_API__TIMEOUT_SECONDS", "10"),
            ("CLUBHOUSE_SESSION__REVALIDATE_ON_START", "true"),
        ])
        .expect("config");

        assert_eq!(config.api.base_url, "https://club.example.org/api");
        assert_eq!(config.api.timeout(), Duration::from_secs(10));
        assert!(config.session.revalidate_on_start);
        assert_eq!(config.session.profile_path, "/auth/me");
        assert_eq!(config.storage.path, PathBuf::from("clubhouse-session.json"));
        assert_eq!(config.guard.guard().fallback_path(), "/");
        assert_eq!(config.guard.guard().login_path(), "/login");
    }

    #[test]
    fn base_url_is_required() {
        assert!(load(&[("CLUBHOUSE_STORAGE__PATH", "/tmp/s.json")]).is_err());
    }
}
