// # Updater Trait
//
// Defines the interface for pushing an IP to a DNS provider's update API.
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::traits::Updater;
//
// let report = updater.update(&settings, Some("1.2.3.4".parse()?)).await?;
// println!("{} now points at {}", settings.build_domain_name(), report.ip);
// ```

use async_trait::async_trait;
use std::net::IpAddr;

use crate::record::{Provider, Settings};

/// Result of a successful provider update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    /// The IP the record now points at
    ///
    /// When the update was sent without an IP the provider picked the address
    /// itself, and this is the one it reported back.
    pub ip: IpAddr,
    /// Human-readable detail from the provider
    pub message: String,
}

impl UpdateReport {
    pub fn new(ip: IpAddr, message: impl Into<String>) -> Self {
        Self {
            ip,
            message: message.into(),
        }
    }
}

/// A provider's update API
///
/// One implementation per [`Provider`]. Implementations receive the full,
/// already verified [`Settings`] and read their own credential variant from it.
///
/// # Contract
///
/// - Single shot: one API call per invocation, no retry or backoff
///   (the engine retries on its next cycle).
/// - No access to record state: the engine commits the outcome.
/// - Network timeouts are the implementation's responsibility.
#[async_trait]
pub trait Updater: Send + Sync {
    /// Point the record at `ip`
    ///
    /// # Parameters
    ///
    /// - `settings`: the record to update
    /// - `ip`: the target IP, or `None` to let the provider use the address
    ///   the request came from (`IpMethod::Provider`)
    ///
    /// # Returns
    ///
    /// - `Ok(UpdateReport)`: the provider accepted the update
    /// - `Err(Error)`: network error, rejection or unexpected response
    async fn update(
        &self,
        settings: &Settings,
        ip: Option<IpAddr>,
    ) -> Result<UpdateReport, crate::Error>;

    /// The provider this updater talks to
    fn provider(&self) -> Provider;
}
