//! Reconciliation engine
//!
//! The DdnsEngine is responsible for:
//! - Discovering the public IP of each record through its IP method
//! - Deciding whether the record needs a provider call
//! - Calling the provider's Updater outside the record lock
//! - Committing the outcome and persisting the resulting History
//!
//! ## Architecture
//!
//! ```text
//!                     ┌──────────────┐
//!          ┌──────────│ DdnsEngine   │──────────┐
//!          │          └──────────────┘          │
//!          ▼                  │                 ▼
//! ┌─────────────────┐         │         ┌───────────────┐
//! │ UpdaterRegistry │         │         │ HistoryStore  │
//! │ (IpGetter,      │         │         │ (persist)     │
//! │  Updater)       │         ▼         └───────────────┘
//! └─────────────────┘  ┌──────────────┐
//!                      │ RecordState  │
//!                      │ (lock)       │
//!                      └──────────────┘
//! ```
//!
//! ## Reconciliation Flow
//!
//! 1. Snapshot the record (shared lock)
//! 2. Discover the IP unless the provider discovers it
//! 3. Skip the provider call if the IP is unchanged since the last success, or
//!    if DNS already resolves the record to it
//! 4. Mark the record `Updating`, call the Updater with no lock held
//! 5. Apply the outcome (exclusive lock) and persist the History
//!
//! ## Scheduling
//!
//! [`DdnsEngine::run_with_shutdown`] spawns one task per record. Each task
//! reconciles its record, sleeps for the record's `delay`, and repeats, so a
//! record never has two reconciliations in flight.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::record::{IpMethod, RecordId, RecordSet, RecordSnapshot, StatusCode};
use crate::registry::UpdaterRegistry;
use crate::traits::{HistoryStore, HostResolver, SystemResolver};

/// Events emitted by the DdnsEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Engine started
    Started {
        /// Records with a registered updater
        active_records: usize,
    },

    /// No provider call was needed
    UpdateSkipped { record_key: String, current_ip: IpAddr },

    /// Provider accepted the update
    UpdateSucceeded {
        record_key: String,
        new_ip: IpAddr,
        previous_ip: Option<IpAddr>,
    },

    /// Discovery or provider call failed
    UpdateFailed { record_key: String, error: String },

    /// Engine stopped
    Stopped { reason: String },
}

/// Reconciliation driver
///
/// Cheap to clone: every field is shared.
#[derive(Clone)]
pub struct DdnsEngine {
    records: Arc<RecordSet>,
    registry: Arc<UpdaterRegistry>,
    store: Arc<dyn HistoryStore>,
    resolver: Arc<dyn HostResolver>,
    shutdown_timeout: Duration,
    event_tx: mpsc::Sender<EngineEvent>,
}

impl DdnsEngine {
    /// Create a new engine
    ///
    /// Returns the engine and the receiving end of its event channel. DNS
    /// lookups use [`SystemResolver`] until [`DdnsEngine::with_resolver`] says
    /// otherwise.
    pub fn new(
        records: Arc<RecordSet>,
        registry: Arc<UpdaterRegistry>,
        store: Arc<dyn HistoryStore>,
        config: &EngineConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let engine = Self {
            records,
            registry,
            store,
            resolver: Arc::new(SystemResolver),
            shutdown_timeout: Duration::from_secs(config.shutdown_timeout_secs),
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Replace the resolver used for the "already resolves" check
    pub fn with_resolver(mut self, resolver: Arc<dyn HostResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn records(&self) -> &Arc<RecordSet> {
        &self.records
    }

    /// Run one reconciliation attempt for a record
    ///
    /// Returns the status code the record ended in. Discovery and provider
    /// failures are committed to the record as `Failure` before being returned
    /// as errors; the next attempt is the caller's business.
    pub async fn reconcile(&self, id: RecordId) -> Result<StatusCode> {
        let record = self
            .records
            .get(id)
            .ok_or_else(|| Error::not_found(format!("record {id}")))?;
        let snapshot = record.snapshot();
        let settings = Arc::clone(&snapshot.settings);
        let record_key = settings.record_key();
        let updater = self.registry.updater(settings.provider())?;

        let ip = match settings.ip_method {
            IpMethod::Provider => None,
            method => match self.discover(method).await {
                Ok(ip) => Some(ip),
                Err(e) => {
                    record.mark_failed(e.to_string());
                    return Err(self.failed(&record_key, e));
                }
            },
        };

        if let Some(ip) = ip
            && !self.needs_update(&snapshot, ip).await
        {
            debug!("{} already points to {}", settings.build_domain_name(), ip);
            record.mark_up_to_date();
            self.emit_event(EngineEvent::UpdateSkipped {
                record_key,
                current_ip: ip,
            });
            return Ok(StatusCode::UpToDate);
        }

        let previous_ip = snapshot.history.current_ip();
        record.mark_updating(match ip {
            Some(ip) => format!("pushing {ip}"),
            None => "pushing provider-discovered IP".to_string(),
        });

        match updater.update(&settings, ip).await {
            Ok(report) => {
                let history = record.apply_outcome(report.ip, true, report.message);
                self.store.set(&record_key, &history).await?;

                if previous_ip == Some(report.ip) {
                    debug!("{} confirmed at {}", settings.build_domain_name(), report.ip);
                    Ok(StatusCode::UpToDate)
                } else {
                    info!(
                        "Updated {} -> {} (previous: {:?})",
                        settings.build_domain_name(),
                        report.ip,
                        previous_ip
                    );
                    self.emit_event(EngineEvent::UpdateSucceeded {
                        record_key,
                        new_ip: report.ip,
                        previous_ip,
                    });
                    Ok(StatusCode::Success)
                }
            }
            Err(e) => {
                let e = match e {
                    e @ Error::Updater { .. } => e,
                    other => Error::updater(settings.provider(), other.to_string()),
                };
                match ip {
                    Some(ip) => {
                        let history = record.apply_outcome(ip, false, e.to_string());
                        self.store.set(&record_key, &history).await?;
                    }
                    None => record.mark_failed(e.to_string()),
                }
                Err(self.failed(&record_key, e))
            }
        }
    }

    /// Run every record until `shutdown` turns true
    ///
    /// Records whose provider has no registered updater, or whose IP method has
    /// no registered getter, are reported and left idle. On shutdown the engine
    /// waits up to the configured timeout for in-flight attempts, then flushes
    /// the history store.
    pub async fn run_with_shutdown(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let mut runnable = Vec::new();
        for (id, record) in self.records.iter() {
            let settings = record.settings();
            if !self.registry.has_updater(settings.provider()) {
                warn!("No updater registered for {}, record left idle", settings);
                continue;
            }
            if !self.registry.has_ip_getter(settings.ip_method) {
                warn!("No IP getter registered for {}, record left idle", settings);
                continue;
            }
            runnable.push((id, settings.delay));
        }

        info!("Engine started: {} active record(s)", runnable.len());
        self.emit_event(EngineEvent::Started {
            active_records: runnable.len(),
        });

        let mut tasks = JoinSet::new();
        for (id, delay) in runnable {
            let engine = self.clone();
            let shutdown = shutdown.clone();
            tasks.spawn(async move { engine.record_loop(id, delay, shutdown).await });
        }

        // A dropped sender counts as shutdown.
        let _ = shutdown.wait_for(|stop| *stop).await;
        info!("Shutdown signal received");

        let drained = tokio::time::timeout(self.shutdown_timeout, async {
            while tasks.join_next().await.is_some() {}
        })
        .await;
        if drained.is_err() {
            warn!(
                "In-flight updates still running after {:?}, aborting them",
                self.shutdown_timeout
            );
            tasks.abort_all();
        }

        self.emit_event(EngineEvent::Stopped {
            reason: "Shutdown signal".to_string(),
        });

        self.store.flush().await?;
        info!("History flushed, engine stopped");

        Ok(())
    }

    async fn record_loop(&self, id: RecordId, delay: Duration, mut shutdown: watch::Receiver<bool>) {
        loop {
            if *shutdown.borrow() {
                break;
            }

            if let Err(e) = self.reconcile(id).await
                && !e.is_reconciliation_failure()
            {
                warn!("Reconciliation of record {} stopped early: {}", id, e);
            }

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        debug!("Record {} loop finished", id);
    }

    async fn discover(&self, method: IpMethod) -> Result<IpAddr> {
        let getter = self.registry.ip_getter(method)?;
        getter.current().await.map_err(|e| match e {
            e @ Error::IpDiscovery { .. } => e,
            other => Error::ip_discovery(method, other.to_string()),
        })
    }

    /// Whether the provider must be called to point the record at `ip`
    async fn needs_update(&self, snapshot: &RecordSnapshot, ip: IpAddr) -> bool {
        if snapshot.status.code == StatusCode::Failure {
            return true;
        }
        if snapshot.history.is_accepted(ip) {
            return false;
        }
        if snapshot.settings.no_dns_lookup {
            return true;
        }

        let fqdn = snapshot.settings.build_domain_name();
        match self.resolver.resolve(&fqdn).await {
            Ok(addrs) => !addrs.contains(&ip),
            Err(e) => {
                debug!("DNS lookup of {} failed: {}", fqdn, e);
                true
            }
        }
    }

    fn failed(&self, record_key: &str, error: Error) -> Error {
        warn!("Update of {} failed: {}", record_key, error);
        self.emit_event(EngineEvent::UpdateFailed {
            record_key: record_key.to_string(),
            error: error.to_string(),
        });
        error
    }

    fn emit_event(&self, event: EngineEvent) {
        if self.event_tx.try_send(event).is_err() {
            debug!("Event channel full or closed, dropping event");
        }
    }
}
