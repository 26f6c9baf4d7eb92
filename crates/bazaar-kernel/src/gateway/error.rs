//! Gateway error types for `bazaar-kernel`.
//!
//! [`GatewayError`] is raised while a gateway definition is checked, before
//! any socket is opened. Per-request failures live in `bazaar-gateway`.

use thiserror::Error;

/// A gateway definition that cannot be served.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum GatewayError {
    // ── Identity ────────────────────────────────────────────────────────────
    /// The gateway configuration `id` field is empty or whitespace-only.
    #[error("gateway id cannot be empty")]
    EmptyGatewayId,

    // ── Routes ───────────────────────────────────────────────────────────────
    /// The configuration contains no routes.
    #[error("gateway config must define at least one route")]
    NoRoutes,

    /// A route `id` field is empty or whitespace-only.
    #[error("route id cannot be empty")]
    EmptyRouteId,

    /// A route with this id has already been registered.
    #[error("route '{0}' is already registered")]
    DuplicateRoute(String),

    /// A route references an upstream id that is not present in the upstream list.
    #[error("route '{0}' references unknown upstream '{1}'")]
    UnknownUpstream(String, String),

    /// A route path pattern is syntactically invalid.
    #[error("route '{0}' has an invalid path pattern: {1}")]
    InvalidPathPattern(String, String),

    // ── Gates ────────────────────────────────────────────────────────────────
    /// A route declares a role gate but no token gate to populate the identity.
    #[error("route '{0}' requires a role but has no token gate")]
    RoleWithoutToken(String),

    /// A role gate names an empty role.
    #[error("route '{0}' has a role gate with an empty role")]
    EmptyRole(String),

    // ── Upstreams ────────────────────────────────────────────────────────────
    /// The configuration contains no upstreams.
    #[error("gateway config must define at least one upstream")]
    NoUpstreams,

    /// An upstream `id` field is empty or whitespace-only.
    #[error("upstream id cannot be empty")]
    EmptyUpstreamId,

    /// An upstream with this id has already been registered.
    #[error("upstream '{0}' is already registered")]
    DuplicateUpstream(String),

    /// An upstream endpoint URI is syntactically invalid.
    #[error("upstream '{0}' has an invalid endpoint URI: {1}")]
    InvalidEndpoint(String, String),

    // ── Auth ─────────────────────────────────────────────────────────────────
    /// An authentication configuration block is missing a required field.
    #[error("authentication config is missing required field: {0}")]
    InvalidAuthConfig(String),

    // ── Timeouts ─────────────────────────────────────────────────────────────
    /// `request_timeout_ms` or `connect_timeout_ms` is zero, which would
    /// reject every request.
    #[error("upstream timeouts must be greater than 0 ms")]
    InvalidTimeout,
}
