// # ddns-core
//
// Core library for the DDNS updater.
//
// ## Architecture Overview
//
// This library holds the per-record state model and drives reconciliation:
// - **Settings**: immutable per-record configuration, verified per provider
// - **RecordState**: Status and History of one record under one lock
// - **DisplayRow**: pure projection of a record snapshot for the status page
// - **DdnsEngine**: discovers IPs and calls the provider Updater outside the lock
// - **UpdaterRegistry**: maps providers to Updaters and IP methods to IpGetters
// - **HistoryStore**: persistence of History between runs
//
// ## Design Principles
//
// 1. **Immutable settings**: Settings never change after verification, so they are
//    read without locking
// 2. **Short critical sections**: no network or disk I/O under a record lock
// 3. **Per-record isolation**: a slow or failing record never holds up another
// 4. **Library-First**: provider and IP discovery code plug in through traits

pub mod config;
pub mod display;
pub mod engine;
pub mod error;
pub mod record;
pub mod registry;
pub mod state;
pub mod traits;

// Re-export core types for convenience
pub use config::{DdnsConfig, EngineConfig, StateStoreConfig};
pub use display::DisplayRow;
pub use engine::{DdnsEngine, EngineEvent};
pub use error::{Error, Field, Result, ValidationError};
pub use record::{
    History, IpMethod, Provider, RecordId, RecordSet, RecordSnapshot, RecordState, Settings,
    Status, StatusCode,
};
pub use registry::UpdaterRegistry;
pub use state::{FileHistoryStore, MemoryHistoryStore};
pub use traits::{HistoryStore, HostResolver, IpGetter, UpdateReport, Updater};
