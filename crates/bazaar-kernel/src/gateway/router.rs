//! Route table trait and route configuration types.
//!
//! The [`RouteTable`] trait is the single kernel-level abstraction for
//! request routing. Implementations (e.g. the prefix router in
//! `bazaar-gateway`) are filled once at startup and only read afterwards.

use super::error::GatewayError;
use super::gate::GateKind;
use super::types::{HttpMethod, RouteMatch};
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Path matching mode
// ─────────────────────────────────────────────────────────────────────────────

/// How a route's `path_pattern` is compared against the request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathMatch {
    /// The pattern is a mount point: `/products` matches `/products`,
    /// `/products/` and everything below it, but not `/productsX`.
    #[default]
    Prefix,
    /// The pattern must match segment for segment; `{param}` segments
    /// capture exactly one non-empty segment.
    Exact,
}

// ─────────────────────────────────────────────────────────────────────────────
// Route configuration
// ─────────────────────────────────────────────────────────────────────────────

/// A single routing rule binding a method set + path pattern to an upstream
/// and the gates that must pass before forwarding.
///
/// ```text
/// /auth                 prefix: everything under /auth
/// /products/{id}        exact: captures `id`
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RouteConfig {
    /// Unique stable identifier for this route.
    pub id: String,
    /// URL path pattern. Must begin with `/`.
    pub path_pattern: String,
    /// How `path_pattern` is matched.
    #[serde(default)]
    pub match_mode: PathMatch,
    /// Accepted HTTP methods. An empty vec means *all* methods are accepted.
    #[serde(default)]
    pub methods: Vec<HttpMethod>,
    /// Id of the upstream this route forwards to.
    pub upstream_id: String,
    /// Gates that must pass before forwarding, in declaration order.
    #[serde(default)]
    pub gates: Vec<GateKind>,
    /// Remove the literal mount path before forwarding upstream.
    #[serde(default)]
    pub strip_prefix: bool,
    /// Per-route upstream timeout in milliseconds.
    /// A value of `0` means "use the gateway default".
    #[serde(default)]
    pub timeout_ms: u64,
    /// Routing priority: higher values are evaluated first.
    #[serde(default)]
    pub priority: i32,
}

impl RouteConfig {
    /// Create an open prefix route with just id, path_pattern, and upstream_id.
    pub fn new(
        id: impl Into<String>,
        path_pattern: impl Into<String>,
        upstream_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            path_pattern: path_pattern.into(),
            match_mode: PathMatch::Prefix,
            methods: Vec::new(),
            upstream_id: upstream_id.into(),
            gates: Vec::new(),
            strip_prefix: false,
            timeout_ms: 0,
            priority: 0,
        }
    }

    /// Builder: set the path matching mode.
    pub fn with_match(mut self, mode: PathMatch) -> Self {
        self.match_mode = mode;
        self
    }

    /// Builder: restrict to specific HTTP methods.
    pub fn with_methods(mut self, methods: Vec<HttpMethod>) -> Self {
        self.methods = methods;
        self
    }

    /// Builder: append a gate.
    pub fn with_gate(mut self, gate: GateKind) -> Self {
        self.gates.push(gate);
        self
    }

    /// Builder: strip the mount path before forwarding.
    pub fn with_strip_prefix(mut self, strip: bool) -> Self {
        self.strip_prefix = strip;
        self
    }

    /// Builder: set a per-route timeout.
    pub fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = ms;
        self
    }

    /// Builder: set routing priority (higher = evaluated first).
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Pattern split into its non-empty segments.
    pub fn segments(&self) -> Vec<&str> {
        self.path_pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Number of segments that are literals rather than `{param}` captures.
    pub fn literal_segments(&self) -> usize {
        self.segments()
            .iter()
            .filter(|s| !is_param(s))
            .count()
    }

    /// Leading literal part of the pattern, up to the first `{param}`.
    pub fn mount_path(&self) -> String {
        let literal: Vec<&str> = self
            .segments()
            .into_iter()
            .take_while(|s| !is_param(s))
            .collect();
        format!("/{}", literal.join("/"))
    }

    /// Whether the route requires the given gate.
    pub fn requires(&self, gate: &GateKind) -> bool {
        self.gates.contains(gate)
    }

    /// Basic sanity checks run during [`GatewayConfig::validate()`](super::validation::GatewayConfig::validate).
    pub(crate) fn validate(&self) -> Result<(), GatewayError> {
        if self.id.trim().is_empty() {
            return Err(GatewayError::EmptyRouteId);
        }
        if self.path_pattern.trim().is_empty() {
            return Err(GatewayError::InvalidPathPattern(
                self.id.clone(),
                "path pattern cannot be empty".to_string(),
            ));
        }
        if !self.path_pattern.starts_with('/') {
            return Err(GatewayError::InvalidPathPattern(
                self.id.clone(),
                "path pattern must start with '/'".to_string(),
            ));
        }
        for segment in self.segments() {
            let braced = segment.contains('{') || segment.contains('}');
            if !braced {
                continue;
            }
            if !is_param(segment) || segment.len() == 2 {
                return Err(GatewayError::InvalidPathPattern(
                    self.id.clone(),
                    format!("malformed parameter segment '{segment}'"),
                ));
            }
            if self.match_mode == PathMatch::Prefix {
                return Err(GatewayError::InvalidPathPattern(
                    self.id.clone(),
                    "prefix routes cannot capture parameters".to_string(),
                ));
            }
        }

        let has_token = self.gates.contains(&GateKind::Token);
        for gate in &self.gates {
            if let GateKind::Role(role) = gate {
                if role.trim().is_empty() {
                    return Err(GatewayError::EmptyRole(self.id.clone()));
                }
                if !has_token {
                    return Err(GatewayError::RoleWithoutToken(self.id.clone()));
                }
            }
        }
        Ok(())
    }
}

/// `{name}` segment test.
pub fn is_param(segment: &str) -> bool {
    segment.starts_with('{') && segment.ends_with('}')
}

// ─────────────────────────────────────────────────────────────────────────────
// RouteTable trait
// ─────────────────────────────────────────────────────────────────────────────

/// Kernel contract for request routing.
///
/// Implementations receive [`RouteConfig`] entries at startup (via
/// [`register`](RouteTable::register)) and resolve incoming
/// (path, method) pairs to a [`RouteMatch`] at request time.
///
/// The trait is synchronous: lookups do no I/O. Once registration is done
/// the table is shared read-only, so `resolve` takes `&self`.
pub trait RouteTable: Send + Sync {
    /// Register a new route. Returns [`GatewayError::DuplicateRoute`] if a
    /// route with the same `id` is already registered.
    fn register(&mut self, route: RouteConfig) -> Result<(), GatewayError>;

    /// Resolve a request `(path, method)` to the single best matching route.
    /// Returns `None` when no route matches.
    fn resolve(&self, path: &str, method: &HttpMethod) -> Option<RouteMatch>;

    /// All registered routes in evaluation order.
    fn routes(&self) -> Vec<&RouteConfig>;
}
