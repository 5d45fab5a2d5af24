//! Item source trait abstraction.

use async_trait::async_trait;
use levelup_core::RawSnapshot;

/// Error type for source operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur while fetching a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Snapshot not found
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Where snapshots of raw items come from.
///
/// Every call returns a fresh, complete snapshot; the estimator never patches
/// a previous one.
#[async_trait]
pub trait ItemSource: Send + Sync {
    /// Fetch the current items together with their assignments.
    ///
    /// Records that do not decode are rejected individually and returned
    /// alongside the rest; only an unreadable source is an error.
    async fn fetch_snapshot(&self) -> Result<RawSnapshot>;

    /// Short description for logs.
    fn describe(&self) -> String {
        "item source".to_string()
    }
}
