//! Upstream id → forwarder lookup.

use super::forwarder::{ProxyForwarder, upstream_client};
use crate::error::StartupError;
use bazaar_kernel::gateway::{GatewayConfig, GatewayError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Forwarders keyed by upstream id, built once at startup and read-only
/// afterwards.
#[derive(Default, Clone)]
pub struct UpstreamRegistry {
    store: HashMap<String, Arc<ProxyForwarder>>,
}

impl UpstreamRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// One forwarder per configured upstream, all sharing a single
    /// connection pool.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, StartupError> {
        let client = upstream_client(config)?;
        let default_timeout = Duration::from_millis(config.request_timeout_ms);

        let mut registry = Self::new();
        for upstream in &config.upstreams {
            registry.register(ProxyForwarder::new(upstream, client.clone(), default_timeout)?)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, forwarder: ProxyForwarder) -> Result<(), GatewayError> {
        if self.store.contains_key(forwarder.upstream_id()) {
            return Err(GatewayError::DuplicateUpstream(
                forwarder.upstream_id().to_string(),
            ));
        }
        self.store
            .insert(forwarder.upstream_id().to_string(), Arc::new(forwarder));
        Ok(())
    }

    pub fn lookup(&self, id: &str) -> Option<Arc<ProxyForwarder>> {
        self.store.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}
