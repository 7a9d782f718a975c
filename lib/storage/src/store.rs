//! The durable storage abstraction.

use async_trait::async_trait;

use crate::error::StorageError;

/// Key holding the raw bearer token.
pub const AUTH_TOKEN_KEY: &str = "auth_token";

/// Key holding the JSON-serialized user profile.
pub const USER_DATA_KEY: &str = "user_data";

/// String key/value storage that survives process restarts.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Reads a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Deletes a value. Deleting a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Writes several values. Backends that can do so write them in one step.
    async fn set_all(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        for (key, value) in entries {
            self.set(key, value).await?;
        }
        Ok(())
    }

    /// Deletes several values. Backends that can do so delete them in one step.
    async fn remove_all(&self, keys: &[&str]) -> Result<(), StorageError> {
        for key in keys {
            self.remove(key).await?;
        }
        Ok(())
    }
}
