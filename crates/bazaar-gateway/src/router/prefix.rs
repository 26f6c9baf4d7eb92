//! Ordered route table implementing [`RouteTable`].
//!
//! Routes are kept in evaluation order and resolved with a linear scan; the
//! first route whose method set and path pattern both accept the request
//! wins. Evaluation order is fixed at registration time:
//!
//! 1. higher `priority` first;
//! 2. routes with an explicit method list before method wildcards;
//! 3. more literal segments before fewer;
//! 4. [`PathMatch::Exact`] before [`PathMatch::Prefix`];
//! 5. registration order.
//!
//! Route tables are small, so the scan stays cheap and easy to verify.

use bazaar_kernel::gateway::{
    GatewayError, HttpMethod, PathMatch, RouteConfig, RouteMatch, RouteTable,
};
use bazaar_kernel::gateway::router::is_param;
use std::cmp::Reverse;
use std::collections::HashMap;

/// [`RouteTable`] with prefix-mount and `{param}` template matching.
#[derive(Debug, Default)]
pub struct PrefixRouter {
    /// Routes in evaluation order.
    routes: Vec<RouteConfig>,
}

impl PrefixRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a router from a route list, failing on the first duplicate id.
    pub fn from_routes(
        routes: impl IntoIterator<Item = RouteConfig>,
    ) -> Result<Self, GatewayError> {
        let mut router = Self::new();
        for route in routes {
            router.register(route)?;
        }
        Ok(router)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Match `path` against a route's pattern, returning captured params.
    fn match_path(route: &RouteConfig, path: &str) -> Option<HashMap<String, String>> {
        let pattern = route.segments();
        let actual: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match route.match_mode {
            PathMatch::Prefix => {
                if actual.len() < pattern.len() {
                    return None;
                }
                pattern
                    .iter()
                    .zip(&actual)
                    .all(|(p, a)| p == a)
                    .then(HashMap::new)
            }
            PathMatch::Exact => {
                if actual.len() != pattern.len() {
                    return None;
                }
                let mut params = HashMap::new();
                for (p, a) in pattern.iter().zip(&actual) {
                    if is_param(p) {
                        params.insert(p[1..p.len() - 1].to_string(), (*a).to_string());
                    } else if p != a {
                        return None;
                    }
                }
                Some(params)
            }
        }
    }
}

/// Sort key for evaluation order. Ties fall back to registration order
/// because the sort is stable.
fn precedence(route: &RouteConfig) -> (Reverse<i32>, bool, Reverse<usize>, bool) {
    (
        Reverse(route.priority),
        route.methods.is_empty(),
        Reverse(route.literal_segments()),
        route.match_mode == PathMatch::Prefix,
    )
}

impl RouteTable for PrefixRouter {
    fn register(&mut self, route: RouteConfig) -> Result<(), GatewayError> {
        if self.routes.iter().any(|r| r.id == route.id) {
            return Err(GatewayError::DuplicateRoute(route.id));
        }
        // Insert after every route that sorts before or equal to it.
        let key = precedence(&route);
        let pos = self.routes.partition_point(|r| precedence(r) <= key);
        self.routes.insert(pos, route);
        Ok(())
    }

    fn resolve(&self, path: &str, method: &HttpMethod) -> Option<RouteMatch> {
        let path = path.split('?').next().unwrap_or(path);
        for route in &self.routes {
            if !route.methods.is_empty() && !route.methods.contains(method) {
                continue;
            }
            if let Some(path_params) = Self::match_path(route, path) {
                return Some(RouteMatch {
                    route_id: route.id.clone(),
                    upstream_id: route.upstream_id.clone(),
                    path_params,
                    mount_path: route.mount_path(),
                    strip_prefix: route.strip_prefix,
                    timeout_ms: route.timeout_ms,
                });
            }
        }
        None
    }

    fn routes(&self) -> Vec<&RouteConfig> {
        self.routes.iter().collect()
    }
}
