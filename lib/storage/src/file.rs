//! JSON-file storage.
//!
//! The whole store is one JSON object of string values. Every write
//! replaces the file through a temporary sibling and a rename, so a crash
//! leaves either the old or the new contents.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::StorageError;
use crate::store::DurableStore;

type Entries = BTreeMap<String, String>;

/// A [`DurableStore`] persisted to a single JSON file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileStore {
    /// Creates a store at `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<Entries, StorageError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    reason: e.to_string(),
                });
            }
        };

        if text.trim().is_empty() {
            return Ok(Entries::new());
        }

        serde_json::from_str(&text).map_err(|e| StorageError::Corrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    /// Reads entries for modification. A corrupt file is replaced rather
    /// than blocking every later write.
    async fn read_for_update(&self) -> Result<Entries, StorageError> {
        match self.read_entries().await {
            Err(StorageError::Corrupt { reason, .. }) => {
                warn!(path = %self.path.display(), %reason, "discarding corrupt storage file");
                Ok(Entries::new())
            }
            other => other,
        }
    }

    async fn write_entries(&self, entries: &Entries) -> Result<(), StorageError> {
        let io_err = |e: std::io::Error| StorageError::Io {
            path: self.path.clone(),
            reason: e.to_string(),
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(entries).map_err(|e| StorageError::Serialize {
            reason: e.to_string(),
        })?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, json).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(io_err)?;

        debug!(path = %self.path.display(), entries = entries.len(), "storage file written");
        Ok(())
    }
}

#[async_trait]
impl DurableStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_entries().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.set_all(&[(key, value)]).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.remove_all(&[key]).await
    }

    async fn set_all(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut current = self.read_for_update().await?;
        for (key, value) in entries {
            current.insert((*key).to_string(), (*value).to_string());
        }
        self.write_entries(&current).await
    }

    async fn remove_all(&self, keys: &[&str]) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut current = self.read_for_update().await?;
        let before = current.len();
        for key in keys {
            current.remove(*key);
        }
        let exists = tokio::fs::try_exists(&self.path).await.unwrap_or(false);
        if current.len() == before && !exists {
            return Ok(());
        }
        self.write_entries(&current).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{AUTH_TOKEN_KEY, USER_DATA_KEY};

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().join("session.json"));
        assert_eq!(store.get(AUTH_TOKEN_KEY).await.expect("get"), None);
    }

    #[tokio::test]
    async fn values_survive_a_new_instance() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("session.json");

        let store = FileStore::new(&path);
        store
            .set_all(&[(AUTH_TOKEN_KEY, "tok1"), (USER_DATA_KEY, "{\"id\":1}")])
            .await
            .expect("set_all");

        let reopened = FileStore::new(&path);
        assert_eq!(
            reopened.get(AUTH_TOKEN_KEY).await.expect("get"),
            Some("tok1".to_string())
        );
        assert_eq!(
            reopened.get(USER_DATA_KEY).await.expect("get"),
            Some("{\"id\":1}".to_string())
        );
    }

    #[tokio::test]
    async fn remove_all_deletes_both_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().join("session.json"));
        store.set(AUTH_TOKEN_KEY, "tok").await.expect("set");
        store.set(USER_DATA_KEY, "{}").await.expect("set");
        store.set("theme", "dark").await.expect("set");

        store
            .remove_all(&[AUTH_TOKEN_KEY, USER_DATA_KEY])
            .await
            .expect("remove_all");

        assert_eq!(store.get(AUTH_TOKEN_KEY).await.expect("get"), None);
        assert_eq!(store.get(USER_DATA_KEY).await.expect("get"), None);
        assert_eq!(
            store.get("theme").await.expect("get"),
            Some("dark".to_string())
        );
    }

    #[tokio::test]
    async fn corrupt_file_fails_reads_but_not_writes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{ definitely not json").expect("write");

        let store = FileStore::new(&path);
        let err = store.get(AUTH_TOKEN_KEY).await.expect_err("corrupt");
        assert!(matches!(err, StorageError::Corrupt { .. }));

        store
            .remove_all(&[AUTH_TOKEN_KEY, USER_DATA_KEY])
            .await
            .expect("remove_all replaces corrupt file");
        assert_eq!(store.get(AUTH_TOKEN_KEY).await.expect("get"), None);
    }

    #[tokio::test]
    async fn empty_file_reads_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");
        std::fs::write(&path, "").expect("write");

        let store = FileStore::new(&path);
        assert_eq!(store.get(USER_DATA_KEY).await.expect("get"), None);
    }
}
