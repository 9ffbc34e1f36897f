//! Configuration types for the DDNS updater
//!
//! ## File Format
//!
//! ```json
//! {
//!   "records": [
//!     { "provider": "duckdns", "domain": "example.com", "host": "@",
//!       "ip_method": "duckduckgo", "token": "..." }
//!   ],
//!   "state_store": { "type": "file", "path": "/var/lib/ddns/history.json" },
//!   "engine": { "history_capacity": 20, "shutdown_timeout_secs": 30 }
//! }
//! ```
//!
//! Records are decoded one by one: a record with an unknown provider or a
//! malformed field is reported as a [`ValidationError`] for that record only and
//! does not prevent the others from loading.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Field, Result, ValidationError};
use crate::record::{DEFAULT_HISTORY_CAPACITY, Provider, Settings};
use crate::state::{FileHistoryStore, MemoryHistoryStore};
use crate::traits::HistoryStore;

/// Main DDNS configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// Raw record entries, decoded by [`DdnsConfig::settings`]
    #[serde(default)]
    pub records: Vec<serde_json::Value>,

    /// History store configuration
    #[serde(default)]
    pub state_store: StateStoreConfig,

    /// Engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl DdnsConfig {
    /// Parse a configuration document
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::config(format!("invalid configuration: {e}")))
    }

    /// Read and parse a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    /// Validate the configuration as a whole
    ///
    /// Individual records are checked by [`DdnsConfig::settings`].
    pub fn validate(&self) -> Result<()> {
        if self.records.is_empty() {
            return Err(Error::config("No records configured"));
        }
        self.engine.validate()?;
        self.state_store.validate()
    }

    /// Decode every record entry
    ///
    /// Returns the decoded settings and, separately, one error per entry that
    /// could not be decoded. Decoded settings are not yet verified.
    pub fn settings(&self) -> (Vec<Settings>, Vec<ValidationError>) {
        let mut settings = Vec::with_capacity(self.records.len());
        let mut errors = Vec::new();
        for raw in &self.records {
            match decode_record(raw) {
                Ok(s) => settings.push(s),
                Err(e) => errors.push(e),
            }
        }
        (settings, errors)
    }
}

fn decode_record(raw: &serde_json::Value) -> std::result::Result<Settings, ValidationError> {
    let field = |name: &str| raw.get(name).and_then(serde_json::Value::as_str);
    let summary = format!(
        "{} | {} | {} | {}",
        field("domain").unwrap_or("?"),
        field("host").unwrap_or("?"),
        field("provider").unwrap_or("?"),
        field("ip_method").unwrap_or("provider"),
    );

    let provider = field("provider")
        .ok_or_else(|| ValidationError::new(Field::Provider, "no provider given", &summary))?;
    provider
        .parse::<Provider>()
        .map_err(|reason| ValidationError::new(Field::Provider, reason, &summary))?;

    serde_json::from_value(raw.clone())
        .map_err(|e| ValidationError::new(Field::Record, e.to_string(), &summary))
}

/// History store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateStoreConfig {
    /// JSON file store
    File {
        /// Path to the state file
        path: String,
    },

    /// In-memory store (not persistent)
    #[default]
    Memory,
}

impl StateStoreConfig {
    pub fn validate(&self) -> Result<()> {
        match self {
            StateStoreConfig::File { path } if path.is_empty() => {
                Err(Error::config("File state store path cannot be empty"))
            }
            _ => Ok(()),
        }
    }

    /// Open the configured store
    pub async fn open(&self) -> Result<Arc<dyn HistoryStore>> {
        Ok(match self {
            StateStoreConfig::File { path } => Arc::new(FileHistoryStore::new(path).await?),
            StateStoreConfig::Memory => Arc::new(MemoryHistoryStore::new()),
        })
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Number of IPs kept per record, current one included
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// How long shutdown waits for in-flight reconciliations (in seconds)
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,

    /// Event channel capacity; events beyond it are dropped
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.history_capacity == 0 {
            return Err(Error::config("engine.history_capacity must be > 0"));
        }
        if self.event_channel_capacity == 0 {
            return Err(Error::config("engine.event_channel_capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

fn default_shutdown_timeout_secs() -> u64 {
    30
}

fn default_event_channel_capacity() -> usize {
    100
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::IpMethod;

    const CONFIG: &str = r#"{
        "records": [
            { "provider": "duckdns", "domain": "example.com", "host": "@",
              "ip_method": "duckduckgo", "token": "d0e3c1a2-7b4f-4e8a-9c6d-1f2e3a4b5c6d" },
            { "provider": "route53", "domain": "example.org", "host": "www" },
            { "provider": "godaddy", "domain": "example.net", "host": "@", "key": "k" },
            { "domain": "example.io", "host": "@" }
        ],
        "state_store": { "type": "memory" },
        "engine": { "history_capacity": 5 }
    }"#;

    #[test]
    fn decodes_records_one_by_one() {
        let config = DdnsConfig::from_json(CONFIG).unwrap();
        config.validate().unwrap();
        assert_eq!(config.engine.history_capacity, 5);
        assert_eq!(config.engine.shutdown_timeout_secs, 30);

        let (settings, errors) = config.settings();

        assert_eq!(settings.len(), 1);
        assert_eq!(settings[0].provider(), Provider::DuckDns);
        assert_eq!(settings[0].ip_method, IpMethod::DuckDuckGo);

        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0].field, Field::Provider);
        assert!(errors[0].reason.contains("route53"));
        assert_eq!(errors[0].summary, "example.org | www | route53 | provider");
        assert_eq!(errors[1].field, Field::Record);
        assert!(errors[1].reason.contains("secret"));
        assert_eq!(errors[2].field, Field::Provider);
    }

    #[test]
    fn provider_names_are_case_sensitive() {
        let config = DdnsConfig::from_json(
            r#"{ "records": [
                { "provider": "GoDaddy", "domain": "example.net", "host": "@",
                  "key": "k", "secret": "s" }
            ] }"#,
        )
        .unwrap();

        let (settings, errors) = config.settings();

        assert!(settings.is_empty());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, Field::Provider);
        assert!(errors[0].reason.contains("GoDaddy"), "{}", errors[0].reason);
    }

    #[test]
    fn empty_configuration_is_rejected() {
        let config = DdnsConfig::from_json("{}").unwrap();
        assert!(config.validate().is_err());
        assert!(matches!(config.state_store, StateStoreConfig::Memory));
    }

    #[test]
    fn file_store_needs_a_path() {
        let config = StateStoreConfig::File { path: String::new() };
        assert!(config.validate().is_err());
    }
}
