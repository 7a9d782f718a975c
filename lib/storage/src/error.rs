//! Storage error types.

use std::fmt;
use std::path::PathBuf;

/// Errors from durable storage operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    Io { path: PathBuf, reason: String },
    /// The backing file exists but is not a JSON object of strings.
    Corrupt { path: PathBuf, reason: String },
    /// The entries could not be serialized.
    Serialize { reason: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, reason } => {
                write!(f, "storage I/O error at '{}': {reason}", path.display())
            }
            Self::Corrupt { path, reason } => {
                write!(f, "storage file '{}' is corrupt: {reason}", path.display())
            }
            Self::Serialize { reason } => {
                write!(f, "failed to serialize storage entries: {reason}")
            }
        }
    }
}

impl std::error::Error for StorageError {}
