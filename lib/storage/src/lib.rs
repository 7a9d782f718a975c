//! Durable client-side key/value storage for the clubhouse client.
//!
//! Values are strings. The session store keeps its credentials under
//! [`AUTH_TOKEN_KEY`] and [`USER_DATA_KEY`] and is the only component that
//! writes them.

mod error;
mod file;
mod memory;
mod store;

pub use error::StorageError;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use store::{AUTH_TOKEN_KEY, DurableStore, USER_DATA_KEY};
