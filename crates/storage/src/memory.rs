//! In-memory item source.

use std::sync::Arc;

use async_trait::async_trait;
use levelup_core::{RawItem, RawSnapshot};
use tokio::sync::Mutex;

use super::{ItemSource, Result};

/// Item source backed by a shared, replaceable list of records.
///
/// Clones share the same records, so a holder can swap the snapshot that the
/// next fetch returns.
#[derive(Clone, Default)]
pub struct MemorySource {
    items: Arc<Mutex<Vec<RawItem>>>,
    fetches: Arc<Mutex<usize>>,
}

impl MemorySource {
    /// Create a source returning `items`.
    pub fn new(items: Vec<RawItem>) -> Self {
        Self {
            items: Arc::new(Mutex::new(items)),
            fetches: Arc::new(Mutex::new(0)),
        }
    }

    /// Replace the records returned by subsequent fetches.
    pub async fn replace(&self, items: Vec<RawItem>) {
        *self.items.lock().await = items;
    }

    /// Number of fetches served so far.
    pub async fn fetch_count(&self) -> usize {
        *self.fetches.lock().await
    }
}

#[async_trait]
impl ItemSource for MemorySource {
    async fn fetch_snapshot(&self) -> Result<RawSnapshot> {
        *self.fetches.lock().await += 1;
        Ok(RawSnapshot::from(self.items.lock().await.clone()))
    }

    fn describe(&self) -> String {
        "in-memory snapshot".to_string()
    }
}
