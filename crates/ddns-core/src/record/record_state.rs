//! Per-record state under a per-record lock
//!
//! ## Locking
//!
//! Each [`RecordState`] owns one `RwLock` guarding its [`Status`] and [`History`]
//! together. [`Settings`] is immutable and sits outside the lock.
//!
//! - Reads ([`RecordState::snapshot`]) take the shared lock and copy both fields,
//!   so a reader sees the pair either before or after a write, never a mix.
//! - Writes ([`RecordState::apply_outcome`] and the `mark_*` methods) take the
//!   exclusive lock for the duration of an in-memory update only.
//!
//! Nothing here blocks on I/O while holding the lock: provider calls and IP
//! discovery happen in the caller between two lock windows.

use std::fmt;
use std::net::IpAddr;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use super::history::{DEFAULT_HISTORY_CAPACITY, History};
use super::settings::Settings;
use super::status::{Status, StatusCode};

/// Consistent copy of one record, taken under its read lock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSnapshot {
    pub settings: Arc<Settings>,
    pub status: Status,
    pub history: History,
}

impl fmt::Display for RecordSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}; {}", self.settings, self.status, self.history)
    }
}

#[derive(Debug)]
struct Mutable {
    status: Status,
    history: History,
}

/// One DNS record: its settings, status and history
#[derive(Debug)]
pub struct RecordState {
    settings: Arc<Settings>,
    history_capacity: usize,
    inner: RwLock<Mutable>,
}

impl RecordState {
    /// Create a record seeded with persisted history
    pub fn new(settings: Settings, history: History) -> Self {
        Self::with_capacity(settings, history, DEFAULT_HISTORY_CAPACITY)
    }

    /// Create a record keeping at most `history_capacity` IPs
    pub fn with_capacity(settings: Settings, mut history: History, history_capacity: usize) -> Self {
        let history_capacity = history_capacity.max(1);
        history.ips.truncate(history_capacity);
        Self {
            settings: Arc::new(settings),
            history_capacity,
            inner: RwLock::new(Mutable {
                status: Status::default(),
                history,
            }),
        }
    }

    /// Immutable settings; readable without the lock
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn history_capacity(&self) -> usize {
        self.history_capacity
    }

    /// Copy settings, status and history under the read lock
    pub fn snapshot(&self) -> RecordSnapshot {
        let guard = self.read();
        RecordSnapshot {
            settings: Arc::clone(&self.settings),
            status: guard.status.clone(),
            history: guard.history.clone(),
        }
    }

    pub fn status(&self) -> Status {
        self.read().status.clone()
    }

    pub fn history(&self) -> History {
        self.read().history.clone()
    }

    /// Flag an update as in flight
    pub fn mark_updating(&self, message: impl Into<String>) {
        self.write().status = Status::new(StatusCode::Updating, message);
    }

    /// Record that no provider call was needed
    ///
    /// History, `last_success` included, is left untouched.
    pub fn mark_up_to_date(&self) {
        self.write().status = Status::new(StatusCode::UpToDate, "");
    }

    /// Record a failed attempt that observed no IP (e.g. discovery failed)
    ///
    /// History is left untouched.
    pub fn mark_failed(&self, message: impl Into<String>) {
        self.write().status = Status::new(StatusCode::Failure, message);
    }

    /// Commit the outcome of a reconciliation attempt observed now
    ///
    /// See [`RecordState::apply_outcome_at`].
    pub fn apply_outcome(&self, new_ip: IpAddr, succeeded: bool, message: impl Into<String>) -> History {
        self.apply_outcome_at(new_ip, succeeded, message, Utc::now())
    }

    /// Commit the outcome of a reconciliation attempt observed at `at`
    ///
    /// - the status is always replaced: `Failure` when the attempt failed,
    ///   `Success` when it pushed a new IP, `UpToDate` when the IP was unchanged;
    /// - `new_ip` is prepended to the history only if it differs from the current IP;
    /// - `last_success` moves to `at` and `accepted_ip` to `new_ip` only when `succeeded`.
    ///
    /// Returns the resulting history so the caller can persist it.
    pub fn apply_outcome_at(
        &self,
        new_ip: IpAddr,
        succeeded: bool,
        message: impl Into<String>,
        at: DateTime<Utc>,
    ) -> History {
        let mut guard = self.write();
        let changed = guard.history.observe(new_ip, self.history_capacity);
        let code = match (succeeded, changed) {
            (false, _) => StatusCode::Failure,
            (true, true) => StatusCode::Success,
            (true, false) => StatusCode::UpToDate,
        };
        guard.status = Status::new(code, message);
        if succeeded {
            guard.history.last_success = Some(at);
            guard.history.accepted_ip = Some(new_ip);
        }
        guard.history.clone()
    }

    // A poisoned lock still guards valid plain data.
    fn read(&self) -> RwLockReadGuard<'_, Mutable> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Mutable> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Display for RecordState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.snapshot(), f)
    }
}
