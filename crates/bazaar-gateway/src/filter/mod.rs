//! Gates and the per-route gate chain.

mod logger;
mod role;
mod token;

pub use logger::AccessLog;
pub use role::{RoleDecision, RoleGate};
pub use token::{AuthError, TokenVerifier};

use crate::error::DispatchResult;
use bazaar_kernel::gateway::{
    Gate, GateAction, GateKind, GatewayContext, GatewayError, RouteConfig,
};
use std::sync::Arc;

/// Ordered list of gates a single route requires.
///
/// Gates are sorted by [`GateOrder`](bazaar_kernel::gateway::GateOrder) in
/// ascending order, so the token gate always runs before any role gate.
/// An empty chain lets every request through.
#[derive(Clone, Default)]
pub struct GateChain {
    gates: Vec<Arc<dyn Gate>>,
}

impl GateChain {
    /// Build a chain from a list of gates, sorted by their declared order.
    pub fn new(mut gates: Vec<Arc<dyn Gate>>) -> Self {
        gates.sort_by_key(|g| g.order());
        Self { gates }
    }

    /// Bind a route's configured gates to concrete implementations.
    ///
    /// Every token gate shares the one process-wide `verifier`.
    pub fn for_route(
        route: &RouteConfig,
        verifier: Option<&Arc<TokenVerifier>>,
    ) -> Result<Self, GatewayError> {
        let mut gates: Vec<Arc<dyn Gate>> = Vec::with_capacity(route.gates.len());
        for kind in &route.gates {
            match kind {
                GateKind::Token => {
                    let verifier = verifier
                        .ok_or_else(|| GatewayError::InvalidAuthConfig("secret".to_string()))?;
                    gates.push(verifier.clone());
                }
                GateKind::Role(role) => gates.push(Arc::new(RoleGate::new(role.clone()))),
            }
        }
        Ok(Self::new(gates))
    }

    /// Gate names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.gates.iter().map(|g| g.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// Run every gate in order, stopping at the first rejection.
    pub async fn run(&self, ctx: &mut GatewayContext) -> DispatchResult<()> {
        for gate in &self.gates {
            match gate.check(ctx).await {
                GateAction::Continue => {}
                GateAction::Reject(rejection) => return Err(rejection.into()),
            }
        }
        Ok(())
    }
}
