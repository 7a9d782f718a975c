//! The session store.
//!
//! Three pieces of state make up a session: the user held here, the token
//! held by the request layer, and the two durable keys. Only this store
//! writes the durable keys. The request layer may drop its token on its own
//! (any 401); the store notices on its next read and removes the durable
//! token to match. The in-memory user is left in place when that happens.

use chrono::{DateTime, Utc};
use clubhouse_access::{AuthenticationError, SessionPhase, SessionSnapshot, UserProfile};
use clubhouse_api::{ApiClient, ApiError};
use clubhouse_storage::{AUTH_TOKEN_KEY, DurableStore, USER_DATA_KEY};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock, watch};
use tracing::{debug, info, instrument, warn};

/// Login endpoint, relative to the API base URL.
pub const LOGIN_PATH: &str = "/auth/login";

#[derive(Debug)]
struct SessionState {
    bootstrapping: bool,
    login_in_flight: bool,
    user: Option<UserProfile>,
    error: Option<String>,
    authenticated_at: Option<DateTime<Utc>>,
}

/// Owner of the signed-in user and the durable credentials.
///
/// Construct one per application and share it behind an `Arc`.
pub struct SessionStore {
    api: ApiClient,
    storage: Arc<dyn DurableStore>,
    state: RwLock<SessionState>,
    login_lock: Mutex<()>,
    events: watch::Sender<SessionSnapshot>,
}

impl SessionStore {
    /// Creates a store in the bootstrapping phase.
    ///
    /// Nothing is read until [`rehydrate`](Self::rehydrate) is called.
    #[must_use]
    pub fn new(api: ApiClient, storage: Arc<dyn DurableStore>) -> Self {
        let (events, _) = watch::channel(SessionSnapshot::bootstrapping());
        Self {
            api,
            storage,
            state: RwLock::new(SessionState {
                bootstrapping: true,
                login_in_flight: false,
                user: None,
                error: None,
                authenticated_at: None,
            }),
            login_lock: Mutex::new(()),
            events,
        }
    }

    /// Creates a store and rehydrates it from durable storage.
    pub async fn bootstrap(api: ApiClient, storage: Arc<dyn DurableStore>) -> Self {
        let store = Self::new(api, storage);
        store.rehydrate().await;
        store
    }

    /// The request layer this store installs tokens into.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Restores the session from durable storage.
    ///
    /// A non-empty token and a parseable user restore the session as-is.
    /// Anything else removes both durable keys and leaves the session
    /// unauthenticated.
    #[instrument(skip(self))]
    pub async fn rehydrate(&self) -> SessionPhase {
        let token = self.read_key(AUTH_TOKEN_KEY).await.filter(|t| !t.is_empty());
        let user_json = self.read_key(USER_DATA_KEY).await;

        let restored = match (token, user_json) {
            (Some(token), Some(json)) => match UserProfile::from_json(&json) {
                Ok(user) => Some((token, user)),
                Err(e) => {
                    warn!(error = %e, "stored user record is unreadable; discarding credentials");
                    None
                }
            },
            (None, None) => None,
            (token, _) => {
                warn!(
                    has_token = token.is_some(),
                    "stored credentials are incomplete; discarding them"
                );
                None
            }
        };

        {
            let mut state = self.state.write().await;
            match restored {
                Some((token, user)) => {
                    self.api.tokens().install(token).await;
                    info!(user = %user.id(), "session restored");
                    state.user = Some(user);
                    state.authenticated_at = Some(Utc::now());
                }
                None => {
                    self.remove_credentials().await;
                    self.api.tokens().clear().await;
                    state.user = None;
                    state.authenticated_at = None;
                }
            }
            state.bootstrapping = false;
        }

        self.publish().await.phase
    }

    /// Signs in with email and password.
    ///
    /// On success the token and user are stored in memory, in the request
    /// layer and in durable storage before this returns. On failure nothing
    /// is persisted and the error message is kept for [`error`](Self::error).
    ///
    /// # Errors
    ///
    /// Returns [`AuthenticationError`] if the server rejects the credentials,
    /// cannot be reached, answers without a token or user, if the
    /// credentials cannot be saved, or if the session changed while the
    /// request was in flight.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, AuthenticationError> {
        let _serial = self.login_lock.lock().await;

        self.state.write().await.login_in_flight = true;
        self.publish().await;

        let generation = self.api.generation().await;
        let result = match self.request_login(email, password).await {
            Ok((token, user)) => self.commit_login(generation, token, user).await,
            Err(e) => Err(e),
        };

        {
            let mut state = self.state.write().await;
            state.login_in_flight = false;
            match &result {
                Ok(user) => {
                    info!(user = %user.id(), "logged in");
                    state.error = None;
                }
                Err(e) => {
                    warn!(error = %e, "login failed");
                    state.error = Some(e.to_string());
                }
            }
        }
        self.publish().await;

        result
    }

    async fn request_login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(String, UserProfile), AuthenticationError> {
        let body = json!({ "email": email, "password": password });
        let response = self
            .api
            .post_public(LOGIN_PATH, &body)
            .await
            .map_err(login_error)?;

        let Some(Value::Object(mut body)) = response else {
            return Err(AuthenticationError::MissingToken);
        };

        let token = body
            .get("access_token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .ok_or(AuthenticationError::MissingToken)?;

        let user = match body.remove("user") {
            None | Some(Value::Null) => {
                return Err(AuthenticationError::MissingUser {
                    reason: "no user in response".to_string(),
                });
            }
            Some(value) => {
                UserProfile::from_value(value).map_err(|e| AuthenticationError::MissingUser {
                    reason: e.to_string(),
                })?
            }
        };

        Ok((token, user))
    }

    /// Persists a successful login. Readers wait on the state lock, so they
    /// see either the old session or the complete new one.
    async fn commit_login(
        &self,
        generation: u64,
        token: String,
        user: UserProfile,
    ) -> Result<UserProfile, AuthenticationError> {
        let mut state = self.state.write().await;

        if self.api.generation().await != generation {
            debug!(generation, "session changed during login; discarding response");
            return Err(AuthenticationError::Superseded);
        }

        let user_json = user
            .to_json()
            .map_err(|e| AuthenticationError::InvalidResponse {
                reason: e.to_string(),
            })?;

        let saved = self
            .storage
            .set_all(&[(AUTH_TOKEN_KEY, token.as_str()), (USER_DATA_KEY, user_json.as_str())])
            .await;
        if let Err(e) = saved {
            warn!(error = %e, "failed to persist credentials; rolling back");
            self.remove_credentials().await;
            self.api.tokens().clear().await;
            state.user = None;
            state.authenticated_at = None;
            return Err(AuthenticationError::Storage {
                reason: e.to_string(),
            });
        }

        self.api.tokens().install(token).await;
        state.user = Some(user.clone());
        state.authenticated_at = Some(Utc::now());
        Ok(user)
    }

    /// Ends the session locally. Never fails; storage errors are logged.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        {
            let mut state = self.state.write().await;
            self.api.tokens().clear().await;
            self.remove_credentials().await;
            state.user = None;
            state.error = None;
            state.authenticated_at = None;
        }
        info!("logged out");
        self.publish().await;
    }

    /// Re-fetches the profile of the signed-in user.
    ///
    /// A 2xx user object replaces the cached profile. A 401 ends the session
    /// through the usual token invalidation. Returns the resulting phase.
    ///
    /// # Errors
    ///
    /// Returns the request error for anything other than a 401. The cached
    /// session is kept in that case.
    #[instrument(skip(self))]
    pub async fn revalidate(&self, profile_path: &str) -> Result<SessionPhase, ApiError> {
        if !self.is_authenticated().await {
            return Ok(self.phase().await);
        }

        let generation = self.api.generation().await;
        let body: Value = match self.api.get(profile_path).await {
            Ok(body) => body,
            Err(e) if e.is_unauthorized() => {
                info!("stored token rejected by the server");
                return Ok(self.publish().await.phase);
            }
            Err(e) => return Err(e),
        };

        let value = match body {
            Value::Object(mut map) if map.get("user").is_some_and(Value::is_object) => {
                map.remove("user").unwrap_or(Value::Null)
            }
            other => other,
        };
        let user = UserProfile::from_value(value).map_err(|e| ApiError::Decode {
            url: profile_path.to_string(),
            reason: e.to_string(),
        })?;

        {
            let mut state = self.state.write().await;
            if self.api.generation().await != generation {
                debug!("session changed during revalidation; discarding profile");
            } else {
                match user.to_json() {
                    Ok(json) => {
                        if let Err(e) = self.storage.set(USER_DATA_KEY, &json).await {
                            warn!(error = %e, "failed to persist refreshed profile");
                        }
                    }
                    Err(e) => warn!(error = %e, "failed to serialize refreshed profile"),
                }
                debug!(user = %user.id(), "profile refreshed");
                state.user = Some(user);
            }
        }

        Ok(self.publish().await.phase)
    }

    /// True iff a user is held, the request layer has a token, and the
    /// durable token is present.
    pub async fn is_authenticated(&self) -> bool {
        self.snapshot().await.is_authenticated()
    }

    /// True while bootstrapping or while a login is in flight.
    pub async fn is_loading(&self) -> bool {
        let state = self.state.read().await;
        state.bootstrapping || state.login_in_flight
    }

    /// Message of the last failed login, cleared by the next success.
    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    /// The user held in memory.
    pub async fn user(&self) -> Option<UserProfile> {
        self.state.read().await.user.clone()
    }

    pub async fn phase(&self) -> SessionPhase {
        self.snapshot().await.phase
    }

    /// Current token generation of the request layer.
    pub async fn generation(&self) -> u64 {
        self.api.generation().await
    }

    /// Returns the current session view.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let (snapshot, reconciled) = self.evaluate().await;
        if reconciled {
            self.events.send_replace(snapshot.clone());
        }
        snapshot
    }

    /// Subscribes to session transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.events.subscribe()
    }

    async fn publish(&self) -> SessionSnapshot {
        let (snapshot, _) = self.evaluate().await;
        self.events.send_replace(snapshot.clone());
        snapshot
    }

    /// Computes the session view. Returns true as the second element if the
    /// durable token had to be removed to match the request layer.
    async fn evaluate(&self) -> (SessionSnapshot, bool) {
        let state = self.state.read().await;
        let (token, generation) = self.api.tokens().current().await;

        let mut reconciled = false;
        let phase = if state.bootstrapping {
            SessionPhase::Bootstrapping
        } else if state.user.is_none() {
            SessionPhase::Unauthenticated
        } else if token.is_none() {
            reconciled = self.drop_revoked_token().await;
            SessionPhase::Unauthenticated
        } else if self.read_key(AUTH_TOKEN_KEY).await.is_some_and(|t| !t.is_empty()) {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Unauthenticated
        };

        let snapshot = SessionSnapshot {
            phase,
            user: state.user.clone(),
            error: state.error.clone(),
            loading: state.bootstrapping || state.login_in_flight,
            generation,
            authenticated_at: state.authenticated_at,
        };
        (snapshot, reconciled)
    }

    /// Removes the durable token after the request layer dropped its own.
    async fn drop_revoked_token(&self) -> bool {
        if self.read_key(AUTH_TOKEN_KEY).await.is_none() {
            return false;
        }
        match self.storage.remove(AUTH_TOKEN_KEY).await {
            Ok(()) => {
                info!("token was invalidated by the server; removed stored token");
                true
            }
            Err(e) => {
                warn!(error = %e, "failed to remove invalidated token");
                false
            }
        }
    }

    async fn read_key(&self, key: &str) -> Option<String> {
        match self.storage.get(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "failed to read durable storage");
                None
            }
        }
    }

    async fn remove_credentials(&self) {
        if let Err(e) = self
            .storage
            .remove_all(&[AUTH_TOKEN_KEY, USER_DATA_KEY])
            .await
        {
            warn!(error = %e, "failed to remove stored credentials");
        }
    }
}

fn login_error(err: ApiError) -> AuthenticationError {
    match err {
        ApiError::Unreachable { .. } => AuthenticationError::Unreachable,
        ApiError::Http { status, message } => AuthenticationError::Rejected { status, message },
        ApiError::Decode { reason, .. } => AuthenticationError::InvalidResponse { reason },
        other @ (ApiError::Encode { .. } | ApiError::Client { .. }) => {
            AuthenticationError::InvalidResponse {
                reason: other.to_string(),
            }
        }
    }
}
