//! Error types for the DDNS updater
//!
//! Two failure classes are kept apart on purpose:
//! - [`ValidationError`]: a record's configuration is structurally invalid.
//!   Fatal for that record only, reported once at load time, never retried.
//! - [`Error::Updater`] / [`Error::IpDiscovery`]: a reconciliation attempt failed.
//!   Recorded into the record's status and retried on the next cycle.

use std::fmt;

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS updater
#[derive(Error, Debug)]
pub enum Error {
    /// Record configuration rejected by validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The provider update call failed
    #[error("Provider error ({provider}): {message}")]
    Updater {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Public IP discovery failed
    #[error("IP discovery error ({method}): {message}")]
    IpDiscovery {
        /// IP method name
        method: String,
        /// Error message
        message: String,
    },

    /// History store errors
    #[error("State store error: {0}")]
    StateStore(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Record or capability not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a provider update error
    pub fn updater(provider: impl fmt::Display, message: impl Into<String>) -> Self {
        Self::Updater {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    /// Create an IP discovery error
    pub fn ip_discovery(method: impl fmt::Display, message: impl Into<String>) -> Self {
        Self::IpDiscovery {
            method: method.to_string(),
            message: message.into(),
        }
    }

    /// Create a state store error
    pub fn state_store(msg: impl Into<String>) -> Self {
        Self::StateStore(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Whether the error comes from a reconciliation attempt (transient, retried
    /// next cycle) rather than from configuration.
    pub fn is_reconciliation_failure(&self) -> bool {
        matches!(self, Self::Updater { .. } | Self::IpDiscovery { .. })
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

/// The settings field a [`ValidationError`] points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Domain,
    Host,
    Provider,
    IpMethod,
    Password,
    Key,
    Secret,
    Token,
    Email,
    UserServiceKey,
    ZoneIdentifier,
    Identifier,
    /// The record could not be decoded at all
    Record,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Domain => "domain",
            Field::Host => "host",
            Field::Provider => "provider",
            Field::IpMethod => "ip_method",
            Field::Password => "password",
            Field::Key => "key",
            Field::Secret => "secret",
            Field::Token => "token",
            Field::Email => "email",
            Field::UserServiceKey => "user_service_key",
            Field::ZoneIdentifier => "zone_identifier",
            Field::Identifier => "identifier",
            Field::Record => "record",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record configuration rejected at load time
///
/// Always carries the offending field and the record identity
/// (`domain | host | provider | method`) so the record can be located among many.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {field} for record {summary}: {reason}")]
pub struct ValidationError {
    /// Which field failed
    pub field: Field,
    /// Why it failed
    pub reason: String,
    /// Identity of the record the field belongs to
    pub summary: String,
}

impl ValidationError {
    pub fn new(field: Field, reason: impl Into<String>, summary: impl fmt::Display) -> Self {
        Self {
            field,
            reason: reason.into(),
            summary: summary.to_string(),
        }
    }
}
