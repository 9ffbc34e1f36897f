// # File History Store
//
// File-based implementation of HistoryStore with crash recovery.
//
// ## Crash Recovery
//
// - Atomic writes: write to `<path>.tmp`, then rename over the state file
// - Backup: the previous state file is copied to `<path>.backup` before each write
// - Recovery: an unparsable state file is replaced by its backup; if the backup is
//   unusable too, every record starts with an empty history
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "records": {
//     "duckdns:@.example.com": {
//       "ips": ["5.6.7.8", "1.2.3.4"],
//       "last_success": "2025-01-09T12:00:00Z"
//     }
//   }
// }
// ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::Error;
use crate::record::History;
use crate::traits::HistoryStore;

/// State file format version
const STATE_FILE_VERSION: &str = "1.0";

/// File-based history store
///
/// Every mutation is written through to disk before it returns.
///
/// # Example
///
/// ```rust,no_run
/// use ddns_core::record::History;
/// use ddns_core::state::FileHistoryStore;
/// use ddns_core::traits::HistoryStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileHistoryStore::new("/var/lib/ddns/history.json").await?;
///     let history = History::new(vec!["1.2.3.4".parse()?], None);
///     store.set("duckdns:@.example.com", &history).await?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileHistoryStore {
    path: PathBuf,
    state: Arc<RwLock<FileState>>,
}

#[derive(Debug)]
struct FileState {
    records: HashMap<String, History>,
    dirty: bool,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct StateFileFormat {
    version: String,
    records: HashMap<String, History>,
}

/// Why a state file could not be loaded
enum LoadFailure {
    /// The file exists but cannot be read
    Unreadable(Error),
    /// The file was read but is not a valid state file
    Corrupt(Error),
}

impl FileHistoryStore {
    /// Create or load a file history store
    ///
    /// Creates missing parent directories, loads the existing state file and
    /// falls back to the backup if the state file is corrupt.
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::config(format!(
                    "Failed to create state directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let records = Self::load_with_recovery(&path).await?;

        Ok(Self {
            path,
            state: Arc::new(RwLock::new(FileState {
                records,
                dirty: false,
            })),
        })
    }

    /// Path of the state file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load_with_recovery(path: &Path) -> Result<HashMap<String, History>, Error> {
        let err = match Self::load(path).await {
            Ok(records) => {
                tracing::debug!("Loaded history from {}: {} records", path.display(), records.len());
                return Ok(records);
            }
            Err(LoadFailure::Unreadable(e)) => return Err(e),
            Err(LoadFailure::Corrupt(e)) => e,
        };

        tracing::warn!("State file appears corrupted: {}. Attempting recovery from backup.", err);

        let backup_path = Self::backup_path(path);
        if !backup_path.exists() {
            tracing::warn!("No backup file found. Starting with empty history.");
            return Ok(HashMap::new());
        }

        match Self::load(&backup_path).await {
            Ok(records) => {
                tracing::info!("Recovered history from backup: {} records", records.len());
                if let Err(e) = fs::copy(&backup_path, path).await {
                    tracing::error!("Failed to restore state file from backup: {}", e);
                }
                Ok(records)
            }
            Err(LoadFailure::Unreadable(e) | LoadFailure::Corrupt(e)) => {
                tracing::error!("Backup also unusable: {}. Starting with empty history.", e);
                Ok(HashMap::new())
            }
        }
    }

    async fn load(path: &Path) -> Result<HashMap<String, History>, LoadFailure> {
        if !path.exists() {
            tracing::debug!("State file does not exist: {}", path.display());
            return Ok(HashMap::new());
        }

        let content = fs::read_to_string(path).await.map_err(|e| {
            LoadFailure::Unreadable(Error::state_store(format!(
                "Failed to read state file {}: {}",
                path.display(),
                e
            )))
        })?;

        let state_file: StateFileFormat = serde_json::from_str(&content).map_err(|e| {
            LoadFailure::Corrupt(Error::state_store(format!(
                "Failed to parse state file {}: {}",
                path.display(),
                e
            )))
        })?;

        if state_file.version != STATE_FILE_VERSION {
            tracing::warn!(
                "State file version mismatch: expected {}, got {}. Attempting to load anyway.",
                STATE_FILE_VERSION,
                state_file.version
            );
        }

        Ok(state_file.records)
    }

    /// Write the whole state atomically
    async fn write_state(&self) -> Result<(), Error> {
        // Held for the whole write so concurrent writers cannot interleave files.
        let mut state = self.state.write().await;

        let state_file = StateFileFormat {
            version: STATE_FILE_VERSION.to_string(),
            records: state.records.clone(),
        };
        let json = serde_json::to_string_pretty(&state_file)
            .map_err(|e| Error::state_store(format!("Failed to serialize history: {}", e)))?;

        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
            file.write_all(json.as_bytes()).await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to write temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
            file.sync_all().await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to sync temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        if self.path.exists()
            && let Err(e) = fs::copy(&self.path, Self::backup_path(&self.path)).await
        {
            tracing::warn!("Failed to create backup: {}", e);
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::state_store(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        state.dirty = false;
        tracing::trace!("History written to {}", self.path.display());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }

    fn backup_path(path: &Path) -> PathBuf {
        let mut backup = path.to_path_buf();
        backup.set_extension("backup");
        backup
    }
}

#[async_trait]
impl HistoryStore for FileHistoryStore {
    async fn get(&self, record_key: &str) -> Result<Option<History>, Error> {
        Ok(self.state.read().await.records.get(record_key).cloned())
    }

    async fn set(&self, record_key: &str, history: &History) -> Result<(), Error> {
        {
            let mut state = self.state.write().await;
            state.records.insert(record_key.to_string(), history.clone());
            state.dirty = true;
        }
        self.write_state().await
    }

    async fn delete(&self, record_key: &str) -> Result<(), Error> {
        {
            let mut state = self.state.write().await;
            if state.records.remove(record_key).is_none() {
                return Ok(());
            }
            state.dirty = true;
        }
        self.write_state().await
    }

    async fn list(&self) -> Result<Vec<String>, Error> {
        Ok(self.state.read().await.records.keys().cloned().collect())
    }

    async fn flush(&self) -> Result<(), Error> {
        let dirty = self.state.read().await.dirty;
        if dirty {
            self.write_state().await
        } else {
            Ok(())
        }
    }
}
