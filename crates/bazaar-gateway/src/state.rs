//! Shared application state for the dispatch pipeline

use crate::backend::UpstreamRegistry;
use crate::filter::{AccessLog, GateChain};
use crate::router::PrefixRouter;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// State shared across all request handlers.
///
/// Everything here is built once by
/// [`GatewayServer::build_app`](crate::server::GatewayServer::build_app)
/// and only read afterwards, so handlers need no locks.
pub struct AppState {
    /// Route table consulted for every proxied request.
    pub routes: PrefixRouter,
    /// Gate chain per route id.
    pub chains: HashMap<String, GateChain>,
    /// Forwarder per upstream id.
    pub upstreams: UpstreamRegistry,
    pub access_log: AccessLog,
    /// OpenAPI document served under `/api-docs`.
    pub docs: Arc<Value>,
}

impl AppState {
    pub fn chain(&self, route_id: &str) -> Option<&GateChain> {
        self.chains.get(route_id)
    }
}
