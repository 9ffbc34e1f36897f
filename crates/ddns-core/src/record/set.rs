//! Arena of records addressed by [`RecordId`]
//!
//! Records are independent: each one carries its own lock, so the set itself
//! needs none once built. Only verified settings are admitted.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::history::{DEFAULT_HISTORY_CAPACITY, History};
use super::record_state::{RecordSnapshot, RecordState};
use super::settings::Settings;
use crate::display::DisplayRow;
use crate::error::{Result, ValidationError};
use crate::traits::HistoryStore;

/// Index of a record in a [`RecordSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(usize);

impl RecordId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// All records known to the process
#[derive(Debug)]
pub struct RecordSet {
    records: Vec<Arc<RecordState>>,
    history_capacity: usize,
}

impl Default for RecordSet {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordSet {
    pub fn new() -> Self {
        Self::with_history_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_history_capacity(history_capacity: usize) -> Self {
        Self {
            records: Vec::new(),
            history_capacity,
        }
    }

    /// Admit a record after verifying its settings
    pub fn insert(&mut self, settings: Settings, history: History) -> std::result::Result<RecordId, ValidationError> {
        settings.verify()?;
        Ok(self.push(settings, history))
    }

    fn push(&mut self, settings: Settings, history: History) -> RecordId {
        let id = RecordId(self.records.len());
        self.records.push(Arc::new(RecordState::with_capacity(
            settings,
            history,
            self.history_capacity,
        )));
        id
    }

    /// Build a set from configured settings, seeding histories from `store`
    ///
    /// Records failing verification are left out and returned alongside the set;
    /// the others are admitted with their persisted history (empty if none).
    pub async fn load(
        settings: Vec<Settings>,
        store: &dyn HistoryStore,
        history_capacity: usize,
    ) -> Result<(Self, Vec<ValidationError>)> {
        let mut set = Self::with_history_capacity(history_capacity);
        let mut rejected = Vec::new();

        for settings in settings {
            if let Err(e) = settings.verify() {
                warn!("Record rejected, fix its configuration: {}", e);
                rejected.push(e);
                continue;
            }
            let history = store.get(&settings.record_key()).await?.unwrap_or_default();
            debug!("Seeded {} with {} IP(s)", settings, history.len());
            set.push(settings, history);
        }

        Ok((set, rejected))
    }

    pub fn get(&self, id: RecordId) -> Option<&Arc<RecordState>> {
        self.records.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = RecordId> + '_ {
        (0..self.records.len()).map(RecordId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RecordId, &Arc<RecordState>)> {
        self.records.iter().enumerate().map(|(i, r)| (RecordId(i), r))
    }

    /// One consistent snapshot per record, each taken under its own read lock
    pub fn snapshots(&self) -> Vec<RecordSnapshot> {
        self.records.iter().map(|r| r.snapshot()).collect()
    }

    /// Display rows for every record, rendered at `now`
    pub fn display_rows(&self, now: DateTime<Utc>) -> Vec<DisplayRow> {
        self.snapshots()
            .iter()
            .map(|snapshot| DisplayRow::from_snapshot(snapshot, now))
            .collect()
    }
}
