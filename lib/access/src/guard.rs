//! Route guarding by session presence and role.
//!
//! The guard is advisory. It keeps the client from showing views the user
//! cannot use, but it is not a security boundary: the API server enforces
//! authorization on every request independently, and a denied view is a
//! navigation outcome rather than an error.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::role::{Role, RoleSet};

/// Default redirect for users lacking the required role.
pub const DEFAULT_FALLBACK_PATH: &str = "/";

/// Default redirect for unauthenticated users.
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// What the guard knows about the current viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessContext {
    authenticated: bool,
    role: Option<Role>,
}

impl AccessContext {
    /// A viewer without a session.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            authenticated: false,
            role: None,
        }
    }

    /// A viewer with a session and, possibly, a role.
    #[must_use]
    pub fn authenticated(role: Option<Role>) -> Self {
        Self {
            authenticated: true,
            role,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    #[must_use]
    pub fn role(&self) -> Option<&Role> {
        self.role.as_ref()
    }
}

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GuardDecision {
    /// The view may be shown.
    Allow,
    /// No session: send the viewer to the login page.
    RedirectToLogin { to: String },
    /// Session present but role not permitted: send the viewer elsewhere.
    Redirect { to: String },
}

impl GuardDecision {
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Returns the redirect target, if the view was denied.
    #[must_use]
    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Self::Allow => None,
            Self::RedirectToLogin { to } | Self::Redirect { to } => Some(to),
        }
    }
}

/// Role guard with configurable redirect targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGuard {
    #[serde(default = "default_login_path")]
    login_path: String,
    #[serde(default = "default_fallback_path")]
    fallback_path: String,
}

fn default_login_path() -> String {
    DEFAULT_LOGIN_PATH.to_string()
}

fn default_fallback_path() -> String {
    DEFAULT_FALLBACK_PATH.to_string()
}

impl Default for RoleGuard {
    fn default() -> Self {
        Self {
            login_path: default_login_path(),
            fallback_path: default_fallback_path(),
        }
    }
}

impl RoleGuard {
    /// Creates a guard with custom redirect targets.
    #[must_use]
    pub fn new(login_path: impl Into<String>, fallback_path: impl Into<String>) -> Self {
        Self {
            login_path: login_path.into(),
            fallback_path: fallback_path.into(),
        }
    }

    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    #[must_use]
    pub fn fallback_path(&self) -> &str {
        &self.fallback_path
    }

    /// Decides whether the viewer may see a view restricted to `allowed`.
    ///
    /// An empty allow-list admits any authenticated viewer. A viewer without
    /// a role is denied by any non-empty allow-list.
    #[must_use]
    pub fn check(&self, ctx: &AccessContext, allowed: &RoleSet) -> GuardDecision {
        if !ctx.is_authenticated() {
            return GuardDecision::RedirectToLogin {
                to: self.login_path.clone(),
            };
        }

        if allowed.is_empty() {
            return GuardDecision::Allow;
        }

        match ctx.role() {
            Some(role) if allowed.contains(role) => GuardDecision::Allow,
            role => {
                debug!(
                    role = role.map(Role::as_str).unwrap_or("<none>"),
                    "role not in allow-list"
                );
                GuardDecision::Redirect {
                    to: self.fallback_path.clone(),
                }
            }
        }
    }
}
