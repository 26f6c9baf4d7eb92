//! Role authorization gate.
//!
//! Runs after the token gate and compares the verified identity's role to
//! the route's required role. Exact, case-sensitive match; there is no role
//! hierarchy.

use async_trait::async_trait;
use bazaar_kernel::gateway::{
    Gate, GateAction, GateOrder, GateRejection, GatewayContext, Identity,
};
use tracing::{error, warn};

/// Outcome of [`RoleGate::authorize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleDecision {
    Allowed,
    Denied,
}

/// Permits only identities carrying `required_role`.
pub struct RoleGate {
    required_role: String,
}

impl RoleGate {
    pub fn new(required_role: impl Into<String>) -> Self {
        Self {
            required_role: required_role.into(),
        }
    }

    pub fn required_role(&self) -> &str {
        &self.required_role
    }

    /// Decide on an identity. No identity means the token gate did not run,
    /// which is denied.
    pub fn authorize(identity: Option<&Identity>, required_role: &str) -> RoleDecision {
        match identity {
            Some(identity) if identity.role == required_role => RoleDecision::Allowed,
            _ => RoleDecision::Denied,
        }
    }
}

#[async_trait]
impl Gate for RoleGate {
    fn name(&self) -> &str {
        "role"
    }

    fn order(&self) -> GateOrder {
        GateOrder::AUTHORIZE
    }

    async fn check(&self, ctx: &mut GatewayContext) -> GateAction {
        if ctx.identity.is_none() {
            error!(
                request_id = %ctx.request.id,
                route = ctx.route_id(),
                "role gate reached without an identity; denying"
            );
        }

        match Self::authorize(ctx.identity.as_ref(), &self.required_role) {
            RoleDecision::Allowed => GateAction::Continue,
            RoleDecision::Denied => {
                warn!(
                    request_id = %ctx.request.id,
                    route = ctx.route_id(),
                    subject = ctx.identity.as_ref().map(|i| i.subject.as_str()).unwrap_or("-"),
                    required_role = %self.required_role,
                    "rejected request: role"
                );
                GateAction::Reject(GateRejection::Forbidden {
                    required_role: self.required_role.clone(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_kernel::gateway::{GatewayRequest, HttpMethod};

    fn ctx_with(identity: Option<Identity>) -> GatewayContext {
        let mut ctx =
            GatewayContext::new(GatewayRequest::new("r-1", "/products/9", HttpMethod::Delete));
        ctx.identity = identity;
        ctx
    }

    #[test]
    fn matching_role_is_allowed() {
        let admin = Identity::new("u-1", "ADMIN");
        assert_eq!(RoleGate::authorize(Some(&admin), "ADMIN"), RoleDecision::Allowed);
    }

    #[test]
    fn other_role_is_denied() {
        let user = Identity::new("u-2", "USER");
        assert_eq!(RoleGate::authorize(Some(&user), "ADMIN"), RoleDecision::Denied);
    }

    #[test]
    fn role_match_is_case_sensitive() {
        let admin = Identity::new("u-1", "admin");
        assert_eq!(RoleGate::authorize(Some(&admin), "ADMIN"), RoleDecision::Denied);
    }

    #[test]
    fn missing_identity_fails_closed() {
        assert_eq!(RoleGate::authorize(None, "ADMIN"), RoleDecision::Denied);
    }

    #[tokio::test]
    async fn gate_rejects_with_required_role() {
        let gate = RoleGate::new("ADMIN");
        let mut ctx = ctx_with(Some(Identity::new("u-2", "USER")));
        assert_eq!(
            gate.check(&mut ctx).await,
            GateAction::Reject(GateRejection::Forbidden {
                required_role: "ADMIN".to_string()
            })
        );
    }

    #[tokio::test]
    async fn gate_without_identity_rejects_instead_of_panicking() {
        let gate = RoleGate::new("ADMIN");
        let mut ctx = ctx_with(None);
        assert!(matches!(gate.check(&mut ctx).await, GateAction::Reject(_)));
    }

    #[tokio::test]
    async fn gate_passes_admin() {
        let gate = RoleGate::new("ADMIN");
        let mut ctx = ctx_with(Some(Identity::new("u-1", "ADMIN")));
        assert_eq!(gate.check(&mut ctx).await, GateAction::Continue);
    }
}
