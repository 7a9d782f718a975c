//! Observable session state.
//!
//! The session store publishes a [`SessionSnapshot`] on every transition.
//! Snapshots are plain values: holding one never keeps a session alive and
//! never reflects later changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::guard::AccessContext;
use crate::user::UserProfile;

/// Lifecycle phase of the session store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Durable storage is still being read.
    Bootstrapping,
    /// User in memory and token in durable storage agree.
    Authenticated,
    /// No usable credentials.
    Unauthenticated,
}

impl SessionPhase {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bootstrapping => "bootstrapping",
            Self::Authenticated => "authenticated",
            Self::Unauthenticated => "unauthenticated",
        }
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Current phase.
    pub phase: SessionPhase,
    /// The user held in memory. May outlive the token after a 401.
    pub user: Option<UserProfile>,
    /// Last login error message, if any.
    pub error: Option<String>,
    /// True while bootstrapping or while a login is in flight.
    pub loading: bool,
    /// Token generation this snapshot was taken at.
    pub generation: u64,
    /// When the current credentials were established (login or rehydration).
    pub authenticated_at: Option<DateTime<Utc>>,
}

impl SessionSnapshot {
    /// The snapshot of a store that has not finished reading storage.
    #[must_use]
    pub fn bootstrapping() -> Self {
        Self {
            phase: SessionPhase::Bootstrapping,
            user: None,
            error: None,
            loading: true,
            generation: 0,
            authenticated_at: None,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.phase == SessionPhase::Authenticated
    }

    /// Builds the context the route guard evaluates.
    #[must_use]
    pub fn access_context(&self) -> AccessContext {
        if !self.is_authenticated() {
            return AccessContext::anonymous();
        }
        AccessContext::authenticated(self.user.as_ref().and_then(|u| u.role()).cloned())
    }
}
