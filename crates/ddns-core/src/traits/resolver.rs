// # Host Resolver Trait
//
// Resolves a record's fully qualified name so the engine can skip updates the
// DNS already reflects (unless the record sets `no_dns_lookup`).

use async_trait::async_trait;
use hickory_resolver::{
    TokioResolver,
    config::{ResolverConfig, ResolverOpts},
    name_server::TokioConnectionProvider,
};
use std::net::IpAddr;
use std::sync::LazyLock;
use tracing::warn;

/// Name resolution used before pushing an update
#[async_trait]
pub trait HostResolver: Send + Sync {
    /// Resolve `fqdn` to its current addresses
    async fn resolve(&self, fqdn: &str) -> Result<Vec<IpAddr>, crate::Error>;
}

/// Shared resolver built from the host DNS configuration
///
/// Falls back to hickory's default upstreams when `/etc/resolv.conf` (or the
/// platform equivalent) cannot be read.
static SYSTEM_RESOLVER: LazyLock<TokioResolver> = LazyLock::new(build_system_resolver);

fn build_system_resolver() -> TokioResolver {
    #[cfg(any(unix, target_os = "windows"))]
    {
        match TokioResolver::builder_tokio() {
            Ok(builder) => return builder.build(),
            Err(e) => warn!("Failed to load system DNS configuration, falling back to defaults: {}", e),
        }
    }

    TokioResolver::builder_with_config(ResolverConfig::default(), TokioConnectionProvider::default())
        .with_options(ResolverOpts::default())
        .build()
}

/// Resolver backed by the system DNS configuration (A and AAAA via hickory)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

#[async_trait]
impl HostResolver for SystemResolver {
    async fn resolve(&self, fqdn: &str) -> Result<Vec<IpAddr>, crate::Error> {
        let lookup = SYSTEM_RESOLVER
            .lookup_ip(fqdn)
            .await
            .map_err(|e| crate::Error::not_found(format!("{fqdn}: {e}")))?;
        Ok(lookup.iter().collect())
    }
}
