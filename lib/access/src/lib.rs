//! Users, roles, session snapshots and route guarding for the clubhouse client.
//!
//! This crate provides:
//! - The cached user profile (`UserProfile`)
//! - Open-ended, case-insensitive roles (`Role`, `RoleSet`)
//! - Observable session state (`SessionPhase`, `SessionSnapshot`)
//! - The advisory route guard (`RoleGuard`, `RouteTable`)
//! - Login error types
//!
//! Nothing here performs I/O.
//!
//! # Example
//!
//! ```
//! use clubhouse_access::{AccessContext, Role, RoleGuard, RoleSet};
//!
//! let guard = RoleGuard::default();
//! let viewer = AccessContext::authenticated(Some(Role::new("director")));
//!
//! assert!(guard.check(&viewer, &RoleSet::admin_tier()).is_allowed());
//! assert!(guard.check(&viewer, &RoleSet::any()).is_allowed());
//! assert!(!guard.check(&AccessContext::anonymous(), &RoleSet::any()).is_allowed());
//! ```

pub mod error;
pub mod guard;
pub mod role;
pub mod routes;
pub mod session;
pub mod user;

// Re-export main types at crate root
pub use error::AuthenticationError;
pub use guard::{AccessContext, GuardDecision, RoleGuard};
pub use role::{Role, RoleSet};
pub use routes::{Route, RouteTable};
pub use session::{SessionPhase, SessionSnapshot};
pub use user::UserProfile;
