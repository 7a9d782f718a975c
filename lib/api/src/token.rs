//! The bearer token held by the request layer.
//!
//! Every change to the token (install or removal) advances a generation
//! counter. Callers that suspend across a request capture the generation
//! first and compare afterwards; a mismatch means the session changed while
//! they were waiting and the response must not be applied.

use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct TokenState {
    token: Option<String>,
    generation: u64,
    /// Generation whose token was revoked by the last change, if that change
    /// was a revoke.
    revoked: Option<u64>,
}

/// Shared holder of the current bearer token.
#[derive(Debug, Default)]
pub struct TokenSlot {
    state: RwLock<TokenState>,
}

impl TokenSlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current token, if any.
    pub async fn token(&self) -> Option<String> {
        self.state.read().await.token.clone()
    }

    /// Returns the current generation.
    pub async fn generation(&self) -> u64 {
        self.state.read().await.generation
    }

    /// Returns the token together with the generation it belongs to.
    pub async fn current(&self) -> (Option<String>, u64) {
        let state = self.state.read().await;
        (state.token.clone(), state.generation)
    }

    /// Installs a token and returns the new generation.
    pub async fn install(&self, token: impl Into<String>) -> u64 {
        let mut state = self.state.write().await;
        state.token = Some(token.into());
        state.generation += 1;
        state.revoked = None;
        debug!(generation = state.generation, "token installed");
        state.generation
    }

    /// Removes the token and returns the new generation.
    pub async fn clear(&self) -> u64 {
        let mut state = self.state.write().await;
        state.token = None;
        state.generation += 1;
        state.revoked = None;
        debug!(generation = state.generation, "token cleared");
        state.generation
    }

    /// Removes the token only if it is still the one issued at `generation`.
    ///
    /// Returns true if the token was removed. A 401 for an old token must
    /// not discard a newer one installed in the meantime.
    pub async fn revoke(&self, generation: u64) -> bool {
        let mut state = self.state.write().await;
        if state.generation != generation || state.token.is_none() {
            return false;
        }
        state.token = None;
        state.generation += 1;
        state.revoked = Some(generation);
        debug!(generation = state.generation, "token revoked");
        true
    }

    /// True if the only change since `generation` was the revoke of the
    /// token issued at `generation`.
    ///
    /// Lets a caller tell its own 401 apart from a login or logout that
    /// happened while its request was in flight.
    pub async fn revoked_at(&self, generation: u64) -> bool {
        self.state.read().await.revoked == Some(generation)
    }
}
