//! Session lifecycle for the clubhouse client.
//!
//! [`SessionStore`] is the single owner of the signed-in user and the only
//! writer of durable credentials. It rehydrates from durable storage on
//! startup, performs login and logout, and publishes a
//! [`SessionSnapshot`](clubhouse_access::SessionSnapshot) on every
//! transition.

pub mod config;
pub mod store;

pub use config::SessionConfig;
pub use store::{LOGIN_PATH, SessionStore};
