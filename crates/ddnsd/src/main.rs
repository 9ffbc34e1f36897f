// # ddnsd - DDNS Daemon
//
// Thin integration layer: every DDNS rule lives in ddns-core.
//
// The ddnsd daemon is responsible for:
// 1. Reading configuration from environment variables and the config file
// 2. Initializing logging and the runtime
// 3. Loading records, seeding their history from the state store
// 4. Running the DDNS engine until SIGTERM/SIGINT
//
// ## Configuration
//
// - `DDNS_CONFIG_PATH`: JSON configuration file (default `/etc/ddns/config.json`)
// - `DDNS_STATE_STORE_PATH`: overrides the configured state store with a file store
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn or error (default `info`)
//
// ## Example
//
// ```bash
// export DDNS_CONFIG_PATH=/etc/ddns/config.json
// export DDNS_STATE_STORE_PATH=/var/lib/ddns/history.json
//
// ddnsd
// ```

use anyhow::{Context, Result};
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use ddns_core::{DdnsConfig, DdnsEngine, RecordSet, StateStoreConfig, UpdaterRegistry};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

const DEFAULT_CONFIG_PATH: &str = "/etc/ddns/config.json";

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    CleanShutdown = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Environment configuration
struct Config {
    config_path: String,
    state_store_path: Option<String>,
    log_level: Level,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        let log_level = env::var("DDNS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_level = match log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => anyhow::bail!(
                "DDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                log_level
            ),
        };

        let state_store_path = env::var("DDNS_STATE_STORE_PATH").ok();
        if state_store_path.as_deref() == Some("") {
            anyhow::bail!("DDNS_STATE_STORE_PATH cannot be empty when set");
        }

        Ok(Self {
            config_path: env::var("DDNS_CONFIG_PATH")
                .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string()),
            state_store_path,
            log_level,
        })
    }

    /// Read the configuration file and apply environment overrides
    fn load_ddns_config(&self) -> Result<DdnsConfig> {
        let mut ddns_config = DdnsConfig::from_file(&self.config_path)
            .with_context(|| format!("loading {}", self.config_path))?;
        if let Some(path) = &self.state_store_path {
            ddns_config.state_store = StateStoreConfig::File { path: path.clone() };
        }
        ddns_config.validate()?;
        Ok(ddns_config)
    }
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    let ddns_config = match config.load_ddns_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Configuration error: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    info!("Starting ddnsd daemon");
    info!("Configuration loaded: {} record(s)", ddns_config.records.len());

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(ddns_config).await {
            error!("Daemon error: {:#}", e);
            DdnsExitCode::RuntimeError
        } else {
            DdnsExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Run the daemon
async fn run_daemon(ddns_config: DdnsConfig) -> Result<()> {
    let store = ddns_config
        .state_store
        .open()
        .await
        .context("opening state store")?;

    let (settings, mut rejected) = ddns_config.settings();
    let (records, unverified) = RecordSet::load(
        settings,
        store.as_ref(),
        ddns_config.engine.history_capacity,
    )
    .await?;
    rejected.extend(unverified);

    for e in &rejected {
        warn!("Skipping record, fix your configuration: {}", e);
    }
    if records.is_empty() {
        anyhow::bail!("no valid record to manage");
    }
    for (_, record) in records.iter() {
        info!("{}", record);
    }

    // Updaters and IP getters plug in here; records without one stay idle.
    let registry = Arc::new(UpdaterRegistry::new());

    let (engine, mut events) = DdnsEngine::new(
        Arc::new(records),
        registry,
        store,
        &ddns_config.engine,
    )?;
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            tracing::debug!("Engine event: {:?}", event);
        }
    });

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let engine_task = tokio::spawn(async move { engine.run_with_shutdown(shutdown_rx).await });

    let signal = wait_for_shutdown().await?;
    info!("Received shutdown signal: {}", signal);
    info!("Shutting down daemon");
    let _ = shutdown_tx.send(true);

    engine_task.await.context("engine task panicked")??;
    Ok(())
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
