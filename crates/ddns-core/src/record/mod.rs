//! Per-record data model
//!
//! - [`Settings`]: immutable configuration of one record, gated by [`Settings::verify`]
//! - [`Status`]: outcome of the latest reconciliation attempt
//! - [`History`]: observed IPs, most recent first, and the last success time
//! - [`RecordState`]: the three together, status and history behind one lock
//! - [`RecordSet`]: every record of the process, addressed by [`RecordId`]

mod grammar;
pub mod history;
pub mod record_state;
pub mod set;
pub mod settings;
pub mod status;

pub use history::{DEFAULT_HISTORY_CAPACITY, History};
pub use record_state::{RecordSnapshot, RecordState};
pub use set::{RecordId, RecordSet};
pub use settings::{CloudflareAuth, Credentials, DEFAULT_DELAY, IpMethod, Provider, Settings};
pub use status::{Status, StatusCode};
