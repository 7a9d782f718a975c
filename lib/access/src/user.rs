//! User profile as returned by the authentication endpoint.
//!
//! The profile is cached in durable storage and trusted on read until the
//! next login. Only `id` is required; the typed fields the client reads are
//! optional, and every other field the server sends is kept verbatim so the
//! cached copy round-trips without loss.

use clubhouse_core::UserId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::role::Role;

/// Profile of the authenticated user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Server-assigned user ID.
    id: UserId,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    /// Login email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    /// Role tag, passed through unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<Role>,
    /// Every other field the server sent.
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl UserProfile {
    /// Creates a profile with only an ID.
    #[must_use]
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            email: None,
            role: None,
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn with_role(mut self, role: impl Into<Role>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Parses a profile from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not an object or lacks an `id`.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Parses a profile from its serialized form in durable storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a JSON object with an `id`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serializes the profile for durable storage.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    #[must_use]
    pub fn id(&self) -> &UserId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    #[must_use]
    pub fn role(&self) -> Option<&Role> {
        self.role.as_ref()
    }

    /// Returns a field the client has no typed accessor for.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Name to show in the UI: the display name, else the email, else the ID.
    #[must_use]
    pub fn display_label(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| format!("user {}", self.id))
    }
}
