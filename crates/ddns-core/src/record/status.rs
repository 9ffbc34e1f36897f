use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome class of the latest reconciliation attempt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusCode {
    /// The provider accepted a new IP
    Success,
    /// The last attempt failed; retried next cycle
    Failure,
    /// The record already points at the current IP
    UpToDate,
    /// An update is in flight
    #[default]
    Updating,
}

impl StatusCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusCode::Success => "Success",
            StatusCode::Failure => "Failure",
            StatusCode::UpToDate => "Up to date",
            StatusCode::Updating => "Updating",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current reconciliation state of a record
///
/// Plain data: the "no IP change for ..." wording shown for up-to-date records is
/// derived at render time, see [`DisplayRow`](crate::display::DisplayRow).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub code: StatusCode,
    pub message: String,
}

impl Status {
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{} ({})", self.code, self.message)
        }
    }
}
