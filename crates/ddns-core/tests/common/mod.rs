//! Test doubles and common utilities for contract tests
//!
//! Minimal collaborators that let tests drive the engine and record state
//! without any network access.

#![allow(dead_code)]

use ddns_core::error::{Error, Result};
use ddns_core::record::{CloudflareAuth, Credentials, IpMethod, Provider, Settings};
use ddns_core::traits::{HostResolver, IpGetter, UpdateReport, Updater};
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const DUCKDNS_TOKEN: &str = "d0e3c1a2-7b4f-4e8a-9c6d-1f2e3a4b5c6d";
pub const NAMECHEAP_PASSWORD: &str = "0123456789abcdef0123456789abcdef";
pub const GODADDY_KEY: &str = "dKNBcM4mXRak_46DaXdN9NpDJmCVCbgYhL8";
pub const GODADDY_SECRET: &str = "46DaXdN9NpDJmCVCbgYhL8";
pub const DREAMHOST_KEY: &str = "ABCDEFGH12345678";
pub const CLOUDFLARE_KEY: &str = "c2547eb745079dac9320b638f5e225cf483cc";
pub const CLOUDFLARE_USER_SERVICE_KEY: &str = "v1.0-e24fd090c02efcfecb4de8f4-a7e8f9";

pub fn ip(s: &str) -> IpAddr {
    s.parse().expect("valid IP literal")
}

pub fn namecheap(host: &str) -> Settings {
    Settings::new(
        "example.com",
        host,
        Credentials::Namecheap {
            password: NAMECHEAP_PASSWORD.to_string(),
        },
    )
}

pub fn godaddy(host: &str) -> Settings {
    Settings::new(
        "example.com",
        host,
        Credentials::GoDaddy {
            key: GODADDY_KEY.to_string(),
            secret: GODADDY_SECRET.to_string(),
        },
    )
    .with_ip_method(IpMethod::OpenDns)
}

pub fn duckdns(host: &str) -> Settings {
    Settings::new(
        "example.com",
        host,
        Credentials::DuckDns {
            token: DUCKDNS_TOKEN.to_string(),
        },
    )
    .with_ip_method(IpMethod::DuckDuckGo)
}

pub fn dreamhost(host: &str) -> Settings {
    Settings::new(
        "example.com",
        host,
        Credentials::Dreamhost {
            key: DREAMHOST_KEY.to_string(),
        },
    )
    .with_ip_method(IpMethod::OpenDns)
}

pub fn cloudflare(auth: CloudflareAuth) -> Settings {
    Settings::new(
        "example.com",
        "www",
        Credentials::Cloudflare {
            auth,
            zone_identifier: "0123456789abcdef".to_string(),
            identifier: "fedcba9876543210".to_string(),
            proxied: false,
        },
    )
    .with_ip_method(IpMethod::DuckDuckGo)
}

pub fn cloudflare_api_key() -> Settings {
    cloudflare(CloudflareAuth::ApiKey {
        key: CLOUDFLARE_KEY.to_string(),
        email: "admin@example.com".to_string(),
    })
}

pub fn cloudflare_user_service_key() -> Settings {
    cloudflare(CloudflareAuth::UserServiceKey {
        user_service_key: CLOUDFLARE_USER_SERVICE_KEY.to_string(),
    })
}

/// One minimal valid instance per provider
pub fn valid_settings() -> Vec<Settings> {
    vec![
        namecheap("www"),
        godaddy("www"),
        duckdns("@"),
        dreamhost("@"),
        cloudflare_api_key(),
        cloudflare_user_service_key(),
    ]
}

/// An Updater that records its calls
///
/// Answers with the IP it was given, or `provider_ip` when asked to discover
/// the IP itself. Can be told to fail or to take its time.
pub struct MockUpdater {
    provider: Provider,
    provider_ip: IpAddr,
    delay: Duration,
    failing: bool,
    calls: Arc<Mutex<Vec<(String, Option<IpAddr>)>>>,
}

impl MockUpdater {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            provider_ip: ip("203.0.113.7"),
            delay: Duration::ZERO,
            failing: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Calls as `(record key, ip argument)`
    pub fn calls(&self) -> Arc<Mutex<Vec<(String, Option<IpAddr>)>>> {
        Arc::clone(&self.calls)
    }
}

#[async_trait::async_trait]
impl Updater for MockUpdater {
    async fn update(&self, settings: &Settings, ip: Option<IpAddr>) -> Result<UpdateReport> {
        self.calls
            .lock()
            .unwrap()
            .push((settings.record_key(), ip));

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.failing {
            return Err(Error::updater(self.provider, "401 Unauthorized"));
        }
        Ok(UpdateReport::new(ip.unwrap_or(self.provider_ip), "updated"))
    }

    fn provider(&self) -> Provider {
        self.provider
    }
}

/// An IpGetter returning a settable IP, or failing when unset
pub struct MockIpGetter {
    method: IpMethod,
    ip: Arc<Mutex<Option<IpAddr>>>,
    call_count: Arc<AtomicUsize>,
}

impl MockIpGetter {
    pub fn new(method: IpMethod, ip: Option<IpAddr>) -> Self {
        Self {
            method,
            ip: Arc::new(Mutex::new(ip)),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Handle to change the IP after registration
    pub fn ip_handle(&self) -> Arc<Mutex<Option<IpAddr>>> {
        Arc::clone(&self.ip)
    }

    pub fn call_count(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.call_count)
    }
}

#[async_trait::async_trait]
impl IpGetter for MockIpGetter {
    async fn current(&self) -> Result<IpAddr> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        (*self.ip.lock().unwrap())
            .ok_or_else(|| Error::ip_discovery(self.method, "connection refused"))
    }

    fn method(&self) -> IpMethod {
        self.method
    }
}

/// A resolver answering from a fixed table; unknown names fail
#[derive(Default)]
pub struct StaticResolver {
    answers: HashMap<String, Vec<IpAddr>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, fqdn: &str, ips: &[IpAddr]) -> Self {
        self.answers.insert(fqdn.to_string(), ips.to_vec());
        self
    }
}

#[async_trait::async_trait]
impl HostResolver for StaticResolver {
    async fn resolve(&self, fqdn: &str) -> Result<Vec<IpAddr>> {
        self.answers
            .get(fqdn)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("no such host {fqdn}")))
    }
}
