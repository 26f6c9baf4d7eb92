//! Request-scoped values passed between the route table, the gates and the
//! forwarder ([`RouteTable`](super::router::RouteTable),
//! [`Gate`](super::gate::Gate)). Nothing here knows about sockets or bodies.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Request methods the gateway routes. Anything else is answered with 405.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[non_exhaustive]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    /// Every method the gateway proxies, in declaration order.
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
        HttpMethod::Head,
        HttpMethod::Options,
    ];

    /// Parse a method token ignoring ASCII case. Verbs outside [`Self::ALL`]
    /// yield `None`.
    pub fn from_str_ci(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
    }

    /// Canonical uppercase token, as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}


/// Metadata view of an inbound request flowing through the gate chain.
///
/// The body is deliberately absent: it stays with the runtime's streaming
/// request and is only touched by the forwarder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayRequest {
    /// Unique identifier for correlating this request across logs.
    pub id: String,
    /// Request path without the query string, e.g. `/products/42`.
    pub path: String,
    /// Raw query string without the leading `?`, if any.
    pub query: Option<String>,
    pub method: HttpMethod,
    /// Header map keyed by lowercase name; non-UTF-8 values are omitted.
    pub headers: HashMap<String, String>,
}

impl GatewayRequest {
    /// A request view with no headers and no query.
    pub fn new(id: impl Into<String>, path: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            query: None,
            method,
            headers: HashMap::new(),
        }
    }

    /// Add a header, lowercasing its name.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into().to_lowercase(), value.into());
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_lowercase())
            .map(String::as_str)
    }
}


/// The verified caller behind a bearer credential.
///
/// Lives only inside the [`GatewayContext`] of the request that presented
/// the credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Subject identifier (user id).
    pub subject: String,
    /// Role label, compared exactly by role gates.
    pub role: String,
    /// Expiry as unix seconds, when the credential carries one.
    pub expires_at: Option<u64>,
}

impl Identity {
    pub fn new(subject: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            role: role.into(),
            expires_at: None,
        }
    }
}


/// Where a request goes and how its path is rewritten on the way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteMatch {
    pub route_id: String,
    /// Id of the upstream this route targets.
    pub upstream_id: String,
    /// Path parameters extracted from `{param}` segments.
    pub path_params: HashMap<String, String>,
    /// Literal leading part of the pattern, removed when `strip_prefix` is set.
    pub mount_path: String,
    /// Whether the forwarder removes `mount_path` from the upstream path.
    pub strip_prefix: bool,
    /// Per-route upstream timeout in milliseconds; `0` means gateway default.
    pub timeout_ms: u64,
}

impl RouteMatch {
    /// Path to request from the upstream for the inbound `path`.
    ///
    /// Unchanged unless the route strips its mount path, in which case an
    /// empty remainder becomes `/`.
    pub fn upstream_path<'a>(&self, path: &'a str) -> std::borrow::Cow<'a, str> {
        if !self.strip_prefix {
            return std::borrow::Cow::Borrowed(path);
        }
        let mount = self.mount_path.trim_end_matches('/');
        match path.strip_prefix(mount) {
            Some("") => std::borrow::Cow::Borrowed("/"),
            Some(rest) if rest.starts_with('/') => std::borrow::Cow::Borrowed(rest),
            _ => std::borrow::Cow::Borrowed(path),
        }
    }
}


/// Mutable context that flows through the gate chain for a single request.
///
/// Gates read from and write to this context, so the role gate can see the
/// identity the token gate established. A context is never shared between
/// requests.
#[derive(Debug, Clone)]
pub struct GatewayContext {
    pub request: GatewayRequest,
    /// Set once the route table has resolved the request.
    pub route_match: Option<RouteMatch>,
    /// Identity resolved by the token gate; `None` if unauthenticated.
    pub identity: Option<Identity>,
    /// Free-form attributes written and read by pipeline stages.
    pub attributes: HashMap<String, serde_json::Value>,
}

impl GatewayContext {
    /// Start a context for `request` with nothing resolved yet.
    pub fn new(request: GatewayRequest) -> Self {
        Self {
            request,
            route_match: None,
            identity: None,
            attributes: HashMap::new(),
        }
    }

    /// Id of the matched route, or `"-"` before routing.
    pub fn route_id(&self) -> &str {
        self.route_match
            .as_ref()
            .map(|m| m.route_id.as_str())
            .unwrap_or("-")
    }

    /// Typed read of an attribute; a missing key and a type mismatch both
    /// give `None`.
    pub fn get_attr<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.attributes
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn set_attr<T: serde::Serialize>(&mut self, key: impl Into<String>, val: &T) {
        if let Ok(v) = serde_json::to_value(val) {
            self.attributes.insert(key.into(), v);
        }
    }
}
