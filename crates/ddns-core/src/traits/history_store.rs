// # History Store Trait
//
// Defines the interface for persisting each record's IP history.
//
// ## Purpose
//
// The store seeds every record's `History` at startup and keeps it across
// restarts, so that:
// - the first check after a restart does not re-push an unchanged IP
// - the web view keeps showing previous IPs and the last success time
//
// ## Implementations
//
// - `MemoryHistoryStore`: no persistence (tests, ephemeral deployments)
// - `FileHistoryStore`: JSON file with atomic writes and backup recovery

use async_trait::async_trait;

use crate::record::History;

/// Persistent storage of record histories, keyed by
/// [`Settings::record_key`](crate::record::Settings::record_key)
///
/// # Thread Safety
///
/// All methods must be safe to call concurrently from multiple tasks.
///
/// ## Implementation Guidelines
///
/// - **Async I/O only**: never block the runtime
/// - **Explicit flush**: `flush()` must persist all pending changes
/// - **No business logic**: the store does not decide what goes into a history
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Get the stored history of a record
    ///
    /// # Returns
    ///
    /// - `Ok(Some(History))`: The stored history
    /// - `Ok(None)`: Nothing stored for this record yet
    /// - `Err(Error)`: Storage error
    async fn get(&self, record_key: &str) -> Result<Option<History>, crate::Error>;

    /// Create or replace the stored history of a record
    async fn set(&self, record_key: &str, history: &History) -> Result<(), crate::Error>;

    /// Delete a stored history (no error if absent)
    async fn delete(&self, record_key: &str) -> Result<(), crate::Error>;

    /// List all record keys in the store
    async fn list(&self) -> Result<Vec<String>, crate::Error>;

    /// Persist any pending changes
    async fn flush(&self) -> Result<(), crate::Error>;
}
