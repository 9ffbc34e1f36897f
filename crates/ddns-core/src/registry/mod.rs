//! Capability registry
//!
//! Maps each [`Provider`] to its [`Updater`] and each [`IpMethod`] to its
//! [`IpGetter`], so the engine looks capabilities up instead of branching on
//! provider names.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ddns_core::registry::UpdaterRegistry;
//! use std::sync::Arc;
//!
//! let registry = UpdaterRegistry::new();
//! registry.register_updater(Arc::new(my_duckdns_updater));
//! registry.register_ip_getter(Arc::new(my_opendns_getter));
//!
//! let updater = registry.updater(Provider::DuckDns)?;
//! ```

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::{Error, Result};
use crate::record::{IpMethod, Provider};
use crate::traits::{IpGetter, Updater};

/// Registry of updaters and IP getters
///
/// ## Thread Safety
///
/// Interior mutability with `RwLock`: concurrent lookups, exclusive registration.
#[derive(Default)]
pub struct UpdaterRegistry {
    updaters: RwLock<HashMap<Provider, Arc<dyn Updater>>>,
    ip_getters: RwLock<HashMap<IpMethod, Arc<dyn IpGetter>>>,
}

impl UpdaterRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the updater for its provider, replacing any previous one
    pub fn register_updater(&self, updater: Arc<dyn Updater>) {
        let provider = updater.provider();
        self.updaters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(provider, updater);
    }

    /// Register the IP getter for its method, replacing any previous one
    ///
    /// Getters claiming `IpMethod::Provider` are ignored: that method is served
    /// by the provider's updater.
    pub fn register_ip_getter(&self, getter: Arc<dyn IpGetter>) {
        let method = getter.method();
        if method == IpMethod::Provider {
            tracing::warn!("Ignoring IP getter registered for method {}", method);
            return;
        }
        self.ip_getters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(method, getter);
    }

    /// Look up the updater of a provider
    pub fn updater(&self, provider: Provider) -> Result<Arc<dyn Updater>> {
        self.updaters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&provider)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("no updater registered for provider {provider}")))
    }

    /// Look up the IP getter of a method
    pub fn ip_getter(&self, method: IpMethod) -> Result<Arc<dyn IpGetter>> {
        self.ip_getters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&method)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("no IP getter registered for method {method}")))
    }

    pub fn has_updater(&self, provider: Provider) -> bool {
        self.updaters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&provider)
    }

    pub fn has_ip_getter(&self, method: IpMethod) -> bool {
        method == IpMethod::Provider
            || self
                .ip_getters
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .contains_key(&method)
    }

    /// Providers with a registered updater
    pub fn list_providers(&self) -> Vec<Provider> {
        self.updaters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect()
    }
}
