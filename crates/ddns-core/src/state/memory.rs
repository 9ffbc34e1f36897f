// # Memory History Store
//
// In-memory implementation of HistoryStore.
//
// Provides no persistence across restarts: after a restart every record starts
// with an empty history, so its first check pushes the current IP once.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use async_trait::async_trait;

use crate::record::History;
use crate::traits::HistoryStore;
use crate::Error;

/// In-memory history store
///
/// # Example
///
/// ```rust,no_run
/// use ddns_core::record::History;
/// use ddns_core::state::MemoryHistoryStore;
/// use ddns_core::traits::HistoryStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryHistoryStore::new();
///     let history = History::new(vec!["1.2.3.4".parse()?], None);
///
///     store.set("duckdns:@.example.com", &history).await?;
///     assert_eq!(store.get("duckdns:@.example.com").await?, Some(history));
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryHistoryStore {
    inner: Arc<RwLock<HashMap<String, History>>>,
}

impl MemoryHistoryStore {
    /// Create a new empty memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of records in the store
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn get(&self, record_key: &str) -> Result<Option<History>, Error> {
        Ok(self.inner.read().await.get(record_key).cloned())
    }

    async fn set(&self, record_key: &str, history: &History) -> Result<(), Error> {
        self.inner
            .write()
            .await
            .insert(record_key.to_string(), history.clone());
        Ok(())
    }

    async fn delete(&self, record_key: &str) -> Result<(), Error> {
        self.inner.write().await.remove(record_key);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>, Error> {
        Ok(self.inner.read().await.keys().cloned().collect())
    }

    async fn flush(&self) -> Result<(), Error> {
        Ok(())
    }
}
