//! Streaming reverse proxy to a single upstream.
//!
//! [`ProxyForwarder`] relays the inbound request to
//! `{endpoint}{path}?{query}` and streams the upstream response back. It does
//! not parse either body, so request and response payloads are never
//! buffered in full.

use crate::error::{DispatchError, DispatchResult};
use axum::body::{Body, HttpBody};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Request, Response, header};
use bazaar_kernel::gateway::{
    GatewayConfig, GatewayError, GatewayRequest, RouteMatch, UpstreamDescriptor,
};
use futures::TryStreamExt;
use reqwest::{Client, Url, redirect};
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// Connection-scoped headers that are never relayed in either direction.
const HOP_BY_HOP: [&str; 7] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "transfer-encoding",
    "te",
    "trailer",
    "upgrade",
];

/// Build the connection pool shared by every forwarder.
///
/// Redirects are passed back to the client rather than followed, and system
/// proxy settings are ignored.
pub fn upstream_client(config: &GatewayConfig) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
        .redirect(redirect::Policy::none())
        .no_proxy();
    if config.read_timeout_ms > 0 {
        builder = builder.read_timeout(Duration::from_millis(config.read_timeout_ms));
    }
    builder.build()
}

/// Proxies requests to one upstream service.
pub struct ProxyForwarder {
    upstream_id: String,
    /// `scheme://authority`, no trailing slash.
    origin: String,
    /// `host[:port]` used for the rewritten `Host` header.
    authority: HeaderValue,
    /// Path component of the endpoint, no trailing slash (may be empty).
    base_path: String,
    /// Deadline for upstream response headers when the route sets none.
    default_timeout: Duration,
    client: Client,
}

impl ProxyForwarder {
    /// Create a forwarder for `upstream` on a shared client.
    pub fn new(
        upstream: &UpstreamDescriptor,
        client: Client,
        default_timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let invalid = |reason: String| GatewayError::InvalidEndpoint(upstream.id.clone(), reason);

        let url = Url::parse(&upstream.endpoint).map_err(|e| invalid(e.to_string()))?;
        let host = url
            .host_str()
            .ok_or_else(|| invalid("endpoint has no host".to_string()))?;
        let authority = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };

        Ok(Self {
            upstream_id: upstream.id.clone(),
            origin: format!("{}://{}", url.scheme(), authority),
            authority: HeaderValue::from_str(&authority).map_err(|e| invalid(e.to_string()))?,
            base_path: url.path().trim_end_matches('/').to_string(),
            default_timeout,
            client,
        })
    }

    pub fn upstream_id(&self) -> &str {
        &self.upstream_id
    }

    /// Full upstream URL for an inbound path and query.
    pub fn target_url(&self, path: &str, query: Option<&str>) -> String {
        match query {
            Some(q) => format!("{}{}{}?{}", self.origin, self.base_path, path, q),
            None => format!("{}{}{}", self.origin, self.base_path, path),
        }
    }

    /// Forward `request` according to `route` and stream the response back.
    ///
    /// The upstream path and query come from `view`, so the upstream sees the
    /// same canonical path the route table matched; only method, headers and
    /// body are taken from `request`.
    ///
    /// The upstream status and headers are returned unchanged apart from
    /// hop-by-hop headers. Failing to connect yields
    /// [`DispatchError::UpstreamUnavailable`]; missing the response-headers
    /// deadline yields [`DispatchError::UpstreamTimeout`].
    #[instrument(
        skip(self, view, request, route),
        fields(upstream = %self.upstream_id, route = %route.route_id)
    )]
    pub async fn forward(
        &self,
        view: &GatewayRequest,
        request: Request<Body>,
        route: &RouteMatch,
    ) -> DispatchResult<Response<Body>> {
        let (parts, body) = request.into_parts();
        let path = route.upstream_path(&view.path);
        let url = self.target_url(&path, view.query.as_deref());
        debug!(url = %url, method = %parts.method, "forwarding to upstream");

        let mut headers = strip_hop_by_hop(&parts.headers);
        headers.insert(header::HOST, self.authority.clone());

        let mut builder = self.client.request(parts.method, &url).headers(headers);
        if body.size_hint().exact() != Some(0) {
            builder = builder.body(reqwest::Body::wrap_stream(body.into_data_stream()));
        }

        let deadline = match route.timeout_ms {
            0 => self.default_timeout,
            ms => Duration::from_millis(ms),
        };
        let start = Instant::now();
        let upstream = match tokio::time::timeout(deadline, builder.send()).await {
            Ok(Ok(resp)) => resp,
            Ok(Err(e)) => return Err(self.classify(e)),
            Err(_) => {
                return Err(DispatchError::UpstreamTimeout {
                    upstream_id: self.upstream_id.clone(),
                });
            }
        };
        debug!(
            status = upstream.status().as_u16(),
            latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "upstream responded"
        );

        let mut response = Response::builder().status(upstream.status());
        if let Some(out) = response.headers_mut() {
            *out = strip_hop_by_hop(upstream.headers());
        }

        let upstream_id = self.upstream_id.clone();
        let stream = upstream.bytes_stream().inspect_err(move |e| {
            warn!(upstream = %upstream_id, error = %e, "upstream body stream aborted");
        });

        response
            .body(Body::from_stream(stream))
            .map_err(|e| DispatchError::UpstreamUnavailable {
                upstream_id: self.upstream_id.clone(),
                reason: e.to_string(),
            })
    }

    fn classify(&self, err: reqwest::Error) -> DispatchError {
        warn!(upstream = %self.upstream_id, error = %err, "upstream request failed");
        if err.is_timeout() && !err.is_connect() {
            DispatchError::UpstreamTimeout {
                upstream_id: self.upstream_id.clone(),
            }
        } else {
            DispatchError::UpstreamUnavailable {
                upstream_id: self.upstream_id.clone(),
                reason: err.to_string(),
            }
        }
    }
}

/// Copy `headers`, dropping hop-by-hop headers, any header the `Connection`
/// header nominates, and `Host`.
fn strip_hop_by_hop(headers: &HeaderMap) -> HeaderMap {
    let nominated: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if *name == header::HOST
            || HOP_BY_HOP.contains(&name.as_str())
            || nominated.contains(name)
        {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out
}
