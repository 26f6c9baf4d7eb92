//! Gateway configuration container and definition-time validation.
//!
//! [`GatewayConfig`] aggregates routes, upstreams, token settings and
//! upstream timeouts, and exposes a single [`validate()`](GatewayConfig::validate)
//! method that checks all structural invariants *before* any runtime
//! resources are allocated.

use super::error::GatewayError;
use super::gate::GateKind;
use super::router::RouteConfig;
use super::upstream::UpstreamDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// AuthConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Bearer-token verification settings, shared by every token gate.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret the auth service signs tokens with.
    pub secret: String,
    /// Reject tokens that carry no `exp` claim.
    #[serde(default)]
    pub require_expiry: bool,
    /// Clock skew tolerated when checking `exp`, in seconds.
    #[serde(default)]
    pub leeway_secs: u64,
}

impl AuthConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            require_expiry: false,
            leeway_secs: 0,
        }
    }

    /// Builder: require the `exp` claim.
    pub fn with_require_expiry(mut self, require: bool) -> Self {
        self.require_expiry = require;
        self
    }

    /// Builder: set the expiry leeway.
    pub fn with_leeway_secs(mut self, secs: u64) -> Self {
        self.leeway_secs = secs;
        self
    }

    fn validate(&self) -> Result<(), GatewayError> {
        if self.secret.trim().is_empty() {
            return Err(GatewayError::InvalidAuthConfig("secret".to_string()));
        }
        Ok(())
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"[REDACTED]")
            .field("require_expiry", &self.require_expiry)
            .field("leeway_secs", &self.leeway_secs)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// GatewayConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Top-level gateway configuration.
///
/// Call [`validate()`](Self::validate) to check all structural invariants
/// before passing this config to the gateway runtime.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Unique identifier for this gateway instance.
    pub id: String,
    /// All route definitions, in declaration order.
    pub routes: Vec<RouteConfig>,
    /// All upstream descriptors.
    pub upstreams: Vec<UpstreamDescriptor>,
    /// Token verification settings; required when any route has a token gate.
    pub auth: Option<AuthConfig>,
    /// Default deadline for receiving upstream response headers (must be > 0).
    pub request_timeout_ms: u64,
    /// TCP connect timeout for upstream calls (must be > 0).
    pub connect_timeout_ms: u64,
    /// Idle timeout between upstream body reads; `0` disables it.
    pub read_timeout_ms: u64,
}

impl GatewayConfig {
    /// Construct a minimal config with only a gateway id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            routes: Vec::new(),
            upstreams: Vec::new(),
            auth: None,
            request_timeout_ms: 30_000,
            connect_timeout_ms: 5_000,
            read_timeout_ms: 60_000,
        }
    }

    /// Builder: add a route.
    pub fn with_route(mut self, route: RouteConfig) -> Self {
        self.routes.push(route);
        self
    }

    /// Builder: add an upstream.
    pub fn with_upstream(mut self, upstream: UpstreamDescriptor) -> Self {
        self.upstreams.push(upstream);
        self
    }

    /// Builder: set token verification settings.
    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Builder: set the default upstream response deadline.
    pub fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.request_timeout_ms = ms;
        self
    }

    /// Builder: set the upstream connect timeout.
    pub fn with_connect_timeout_ms(mut self, ms: u64) -> Self {
        self.connect_timeout_ms = ms;
        self
    }

    /// Builder: set the idle read timeout.
    pub fn with_read_timeout_ms(mut self, ms: u64) -> Self {
        self.read_timeout_ms = ms;
        self
    }

    /// Look up an upstream by id.
    pub fn upstream(&self, id: &str) -> Option<&UpstreamDescriptor> {
        self.upstreams.iter().find(|u| u.id == id)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Validation
    // ─────────────────────────────────────────────────────────────────────────

    /// Validate all structural invariants of this configuration.
    ///
    /// Returns the *first* detected [`GatewayError`].
    ///
    /// Checks performed (in order):
    /// 1. Gateway id is non-empty.
    /// 2. At least one route is defined.
    /// 3. At least one upstream is defined.
    /// 4. Request and connect timeouts are non-zero.
    /// 5. Each upstream is well-formed and ids are unique.
    /// 6. Each route is well-formed, ids are unique, and its upstream exists.
    /// 7. If any route has a token gate, an auth config with a secret exists.
    pub fn validate(&self) -> Result<(), GatewayError> {
        // ── 1. Gateway id ────────────────────────────────────────────────────
        if self.id.trim().is_empty() {
            return Err(GatewayError::EmptyGatewayId);
        }

        // ── 2. At least one route ────────────────────────────────────────────
        if self.routes.is_empty() {
            return Err(GatewayError::NoRoutes);
        }

        // ── 3. At least one upstream ─────────────────────────────────────────
        if self.upstreams.is_empty() {
            return Err(GatewayError::NoUpstreams);
        }

        // ── 4. Timeouts are non-zero ─────────────────────────────────────────
        if self.request_timeout_ms == 0 || self.connect_timeout_ms == 0 {
            return Err(GatewayError::InvalidTimeout);
        }

        // ── 5. Upstreams ─────────────────────────────────────────────────────
        let mut upstream_ids: HashSet<&str> = HashSet::new();
        for upstream in &self.upstreams {
            upstream.validate()?;
            if !upstream_ids.insert(upstream.id.as_str()) {
                return Err(GatewayError::DuplicateUpstream(upstream.id.clone()));
            }
        }

        // ── 6. Routes ────────────────────────────────────────────────────────
        let mut route_ids: HashSet<&str> = HashSet::new();
        for route in &self.routes {
            route.validate()?;
            if !route_ids.insert(route.id.as_str()) {
                return Err(GatewayError::DuplicateRoute(route.id.clone()));
            }
            if !upstream_ids.contains(route.upstream_id.as_str()) {
                return Err(GatewayError::UnknownUpstream(
                    route.id.clone(),
                    route.upstream_id.clone(),
                ));
            }
        }

        // ── 7. Token gates need a secret ─────────────────────────────────────
        let needs_auth = self.routes.iter().any(|r| r.requires(&GateKind::Token));
        match &self.auth {
            Some(auth) => auth.validate()?,
            None if needs_auth => {
                return Err(GatewayError::InvalidAuthConfig("secret".to_string()));
            }
            None => {}
        }

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::router::PathMatch;
    use crate::gateway::types::HttpMethod;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn product_upstream() -> UpstreamDescriptor {
        UpstreamDescriptor::new("product", "http://localhost:5002")
    }

    fn products_route() -> RouteConfig {
        RouteConfig::new("products", "/products", "product").with_gate(GateKind::Token)
    }

    fn valid_config() -> GatewayConfig {
        GatewayConfig::new("gateway-test")
            .with_upstream(product_upstream())
            .with_route(products_route())
            .with_auth(AuthConfig::new("s3cret"))
    }

    // ── Happy path ────────────────────────────────────────────────────────────

    #[test]
    fn valid_config_passes_validation() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn open_routes_need_no_auth_config() {
        let cfg = GatewayConfig::new("g")
            .with_upstream(UpstreamDescriptor::new("auth", "http://localhost:5001"))
            .with_route(RouteConfig::new("auth", "/auth", "auth"));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn admin_delete_route_passes() {
        let cfg = valid_config().with_route(
            RouteConfig::new("products-delete", "/products/{id}", "product")
                .with_match(PathMatch::Exact)
                .with_methods(vec![HttpMethod::Delete])
                .with_gate(GateKind::Token)
                .with_gate(GateKind::Role("ADMIN".to_string())),
        );
        assert!(cfg.validate().is_ok());
    }

    // ── Identity errors ───────────────────────────────────────────────────────

    #[test]
    fn whitespace_only_gateway_id_returns_error() {
        let mut cfg = valid_config();
        cfg.id = "   ".to_string();
        assert_eq!(cfg.validate(), Err(GatewayError::EmptyGatewayId));
    }

    // ── Route errors ──────────────────────────────────────────────────────────

    #[test]
    fn no_routes_returns_error() {
        let cfg = GatewayConfig::new("g").with_upstream(product_upstream());
        assert_eq!(cfg.validate(), Err(GatewayError::NoRoutes));
    }

    #[test]
    fn duplicate_route_id_returns_error() {
        let cfg = valid_config().with_route(products_route());
        assert_eq!(
            cfg.validate(),
            Err(GatewayError::DuplicateRoute("products".to_string()))
        );
    }

    #[test]
    fn route_with_unknown_upstream_returns_error() {
        let cfg = valid_config().with_route(RouteConfig::new("auth", "/auth", "auth"));
        assert_eq!(
            cfg.validate(),
            Err(GatewayError::UnknownUpstream(
                "auth".to_string(),
                "auth".to_string()
            ))
        );
    }

    #[test]
    fn path_without_leading_slash_returns_error() {
        let cfg = valid_config().with_route(RouteConfig::new("bad", "products", "product"));
        assert!(matches!(
            cfg.validate(),
            Err(GatewayError::InvalidPathPattern(ref id, _)) if id == "bad"
        ));
    }

    // ── Upstream errors ───────────────────────────────────────────────────────

    #[test]
    fn no_upstreams_returns_error() {
        let cfg = GatewayConfig::new("g").with_route(products_route());
        assert_eq!(cfg.validate(), Err(GatewayError::NoUpstreams));
    }

    #[test]
    fn duplicate_upstream_returns_error() {
        let cfg = valid_config().with_upstream(product_upstream());
        assert_eq!(
            cfg.validate(),
            Err(GatewayError::DuplicateUpstream("product".to_string()))
        );
    }

    // ── Auth / timeout errors ─────────────────────────────────────────────────

    #[test]
    fn token_gate_without_auth_returns_error() {
        let mut cfg = valid_config();
        cfg.auth = None;
        assert_eq!(
            cfg.validate(),
            Err(GatewayError::InvalidAuthConfig("secret".to_string()))
        );
    }

    #[test]
    fn blank_secret_returns_error() {
        let cfg = valid_config().with_auth(AuthConfig::new(""));
        assert_eq!(
            cfg.validate(),
            Err(GatewayError::InvalidAuthConfig("secret".to_string()))
        );
    }

    #[test]
    fn zero_timeout_returns_error() {
        let cfg = valid_config().with_timeout_ms(0);
        assert_eq!(cfg.validate(), Err(GatewayError::InvalidTimeout));
        let cfg = valid_config().with_connect_timeout_ms(0);
        assert_eq!(cfg.validate(), Err(GatewayError::InvalidTimeout));
    }

    #[test]
    fn zero_read_timeout_is_allowed() {
        assert!(valid_config().with_read_timeout_ms(0).validate().is_ok());
    }

    #[test]
    fn debug_output_redacts_secret() {
        let rendered = format!("{:?}", AuthConfig::new("hunter2"));
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("REDACTED"));
    }
}
