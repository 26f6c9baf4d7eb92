//! Gate trait and gate-chain types.
//!
//! A gate is a pass/fail check that must succeed before a request is
//! forwarded. Each route carries its own ordered list of [`GateKind`]s; the
//! runtime binds them to concrete [`Gate`] implementations at startup and
//! sorts them by [`GateOrder`], so authentication always runs before
//! authorization no matter how the route lists them.
//!
//! ```text
//! Request ──► route match ──► Authenticate ──► Authorize ──► forward upstream
//!                                  │               │
//!                                  └── Reject ─────┴──► JSON error response
//! ```

use super::types::GatewayContext;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Gate ordering
// ─────────────────────────────────────────────────────────────────────────────

/// Numeric ordering slot for a gate in the chain.
///
/// Gates with equal order values run in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct GateOrder(pub u32);

impl GateOrder {
    /// Credential verification; establishes the identity.
    pub const AUTHENTICATE: GateOrder = GateOrder(100);
    /// Checks against an already-established identity.
    pub const AUTHORIZE: GateOrder = GateOrder(200);
}

// ─────────────────────────────────────────────────────────────────────────────
// Configured gates
// ─────────────────────────────────────────────────────────────────────────────

/// A gate as declared in route configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "role", rename_all = "snake_case")]
pub enum GateKind {
    /// A valid bearer token is required.
    Token,
    /// The verified identity must carry exactly this role.
    Role(String),
}

impl GateKind {
    /// Chain slot this gate runs in.
    pub fn order(&self) -> GateOrder {
        match self {
            GateKind::Token => GateOrder::AUTHENTICATE,
            GateKind::Role(_) => GateOrder::AUTHORIZE,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Gate outcome
// ─────────────────────────────────────────────────────────────────────────────

/// Why a gate refused a request.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GateRejection {
    /// No `Authorization` header was supplied.
    MissingCredential,
    /// The header is present but is not `Bearer <token>`.
    MalformedCredential,
    /// Signature, expiry, or claims validation failed.
    InvalidCredential,
    /// The identity lacks the required role, or no identity was established.
    Forbidden { required_role: String },
}

/// Instruction returned by [`Gate::check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateAction {
    /// Pass the request to the next gate or to the forwarder.
    Continue,
    /// Short-circuit the chain; nothing further runs for this request.
    Reject(GateRejection),
}

// ─────────────────────────────────────────────────────────────────────────────
// Gate trait
// ─────────────────────────────────────────────────────────────────────────────

/// Kernel contract for a single gate in a route's chain.
///
/// Implementations must be `Send + Sync`; one instance serves every
/// concurrent request, so all per-request state goes into `ctx`.
#[async_trait]
pub trait Gate: Send + Sync {
    /// Stable, human-readable identifier for this gate (used in logs).
    fn name(&self) -> &str;

    /// Position in the chain. Lower values run first.
    fn order(&self) -> GateOrder;

    /// Inspect the request and either let it through or reject it.
    ///
    /// Implementations may write to `ctx` (the token gate sets
    /// `ctx.identity`).
    async fn check(&self, ctx: &mut GatewayContext) -> GateAction;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_sorts_before_authorization() {
        let mut kinds = vec![GateKind::Role("ADMIN".to_string()), GateKind::Token];
        kinds.sort_by_key(GateKind::order);
        assert_eq!(kinds[0], GateKind::Token);
    }

    #[test]
    fn gate_kind_deserializes_from_tagged_form() {
        let token: GateKind = serde_json::from_str(r#"{"kind":"token"}"#).unwrap();
        assert_eq!(token, GateKind::Token);
        let role: GateKind =
            serde_json::from_str(r#"{"kind":"role","role":"ADMIN"}"#).unwrap();
        assert_eq!(role, GateKind::Role("ADMIN".to_string()));
    }
}
