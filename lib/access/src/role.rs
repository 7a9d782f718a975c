//! Role types for club access control.
//!
//! Roles are open-ended string tags assigned by the server (`ADMIN`,
//! `DIRECTOR`, `LEADER`, `MEMBER`, and whatever the server adds later).
//! The client never rejects an unknown role and never assumes the stored
//! spelling is normalized: every comparison uppercases both sides.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A role tag as stored on the user profile.
///
/// The original spelling is preserved for display and serialization.
/// Equality and hashing use the uppercased form, so `"director"` and
/// `"DIRECTOR"` are the same role.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    pub const ADMIN: &'static str = "ADMIN";
    pub const DIRECTOR: &'static str = "DIRECTOR";
    pub const LEADER: &'static str = "LEADER";
    pub const MEMBER: &'static str = "MEMBER";

    /// Creates a role from any string, unchanged.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn admin() -> Self {
        Self::new(Self::ADMIN)
    }

    #[must_use]
    pub fn director() -> Self {
        Self::new(Self::DIRECTOR)
    }

    #[must_use]
    pub fn leader() -> Self {
        Self::new(Self::LEADER)
    }

    #[must_use]
    pub fn member() -> Self {
        Self::new(Self::MEMBER)
    }

    /// Returns the role exactly as the server sent it.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the uppercased form used for comparisons.
    #[must_use]
    pub fn normalized(&self) -> String {
        self.0.to_uppercase()
    }

    /// Returns true if this role belongs to the admin tier.
    #[must_use]
    pub fn is_admin_tier(&self) -> bool {
        RoleSet::admin_tier().contains(self)
    }

    /// Returns true if this role belongs to the staff tier.
    #[must_use]
    pub fn is_staff_tier(&self) -> bool {
        RoleSet::staff_tier().contains(self)
    }
}

impl PartialEq for Role {
    fn eq(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }
}

impl Eq for Role {}

impl Hash for Role {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized().hash(state);
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// An allow-list of roles.
///
/// An empty set is meaningful to the route guard: it admits any
/// authenticated user. Use [`RoleSet::contains`] for plain membership.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet {
    roles: Vec<Role>,
}

impl RoleSet {
    /// Creates an empty allow-list (any authenticated user).
    #[must_use]
    pub fn any() -> Self {
        Self { roles: Vec::new() }
    }

    /// Administrators and directors.
    #[must_use]
    pub fn admin_tier() -> Self {
        Self {
            roles: vec![Role::admin(), Role::director()],
        }
    }

    /// The admin tier plus unit leaders.
    #[must_use]
    pub fn staff_tier() -> Self {
        let mut set = Self::admin_tier();
        set.roles.push(Role::leader());
        set
    }

    /// Creates an allow-list from role names, keeping the given spelling.
    #[must_use]
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        Self {
            roles: names.iter().map(|n| Role::new(n.as_ref())).collect(),
        }
    }

    /// Returns true if the role matches any entry, ignoring case.
    #[must_use]
    pub fn contains(&self, role: &Role) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Returns the roles as a slice.
    #[must_use]
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self {
            roles: iter.into_iter().collect(),
        }
    }
}
