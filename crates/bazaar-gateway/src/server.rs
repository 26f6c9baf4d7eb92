//! Axum-based HTTP gateway server.
//!
//! [`GatewayServer`] wires together the route table, gate chains, and
//! upstream registry into a running axum service.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Liveness check, always `200 OK`. |
//! | `GET`  | `/api-docs` | OpenAPI document. |
//! | `ANY`  | *anything else* | [`dispatch`]: route, gate, forward. |
//!
//! # Dispatch
//!
//! ```text
//! Received ─▶ Authenticating ─▶ Authorizing ─▶ Forwarding ─▶ Completed
//!     │              │                │              │
//!     └──────────────┴────────────────┴──────────────┴──▶ Rejected
//! ```
//!
//! Each request gets its own [`GatewayContext`]; nothing about one request
//! is visible to another.

use crate::backend::UpstreamRegistry;
use crate::config::GatewayServerConfig;
use crate::error::{DispatchError, DispatchResult, StartupError};
use crate::filter::{AccessLog, GateChain, TokenVerifier};
use crate::handlers::{docs_router, health_router, openapi_document};
use crate::router::{PrefixRouter, canonical_path};
use crate::state::AppState;
use axum::{
    Router,
    body::Body,
    extract::{Request, State},
    http::{HeaderValue, Response},
    response::IntoResponse,
};
use bazaar_kernel::gateway::{
    GatewayConfig, GatewayContext, GatewayRequest, HttpMethod, RouteTable,
};
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Correlation header attached to every response and forwarded upstream.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// High-level gateway server.
pub struct GatewayServer {
    config: GatewayServerConfig,
}

impl GatewayServer {
    /// Create a new server from the given configuration.
    pub fn new(config: GatewayServerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GatewayServerConfig {
        &self.config
    }

    /// Build the axum [`Router`] wired to the provided [`GatewayConfig`].
    ///
    /// Validates the config, registers routes and upstreams, and binds each
    /// route's gates. Call [`start()`](Self::start) to bind and serve.
    pub fn build_app(&self, gateway_cfg: &GatewayConfig) -> Result<Router, StartupError> {
        gateway_cfg.validate()?;

        let routes = PrefixRouter::from_routes(gateway_cfg.routes.iter().cloned())?;

        let verifier = gateway_cfg
            .auth
            .as_ref()
            .map(|auth| Arc::new(TokenVerifier::new(auth)));
        let mut chains = HashMap::with_capacity(gateway_cfg.routes.len());
        for route in &gateway_cfg.routes {
            let chain = GateChain::for_route(route, verifier.as_ref())?;
            info!(route = %route.id, gates = ?chain.names(), "route registered");
            chains.insert(route.id.clone(), chain);
        }

        let upstreams = UpstreamRegistry::from_config(gateway_cfg)?;

        let state = Arc::new(AppState {
            routes,
            chains,
            upstreams,
            access_log: AccessLog::new(),
            docs: Arc::new(openapi_document(&format!(
                "http://localhost:{}",
                self.config.port
            ))),
        });

        Ok(Router::new()
            .merge(health_router())
            .merge(docs_router())
            .fallback(dispatch)
            .with_state(state)
            .layer(TraceLayer::new_for_http()))
    }

    /// Bind the server to `0.0.0.0:{port}` and serve until the process exits.
    pub async fn start(self) -> Result<(), StartupError> {
        let app = self.build_app(&self.config.gateway_config())?;
        let addr = format!("0.0.0.0:{}", self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!(addr = %addr, "Bazaar gateway starting");
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        info!("Bazaar gateway stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

/// Route, gate and forward a single request.
pub async fn dispatch(State(state): State<Arc<AppState>>, mut request: Request) -> Response<Body> {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let id_header = HeaderValue::from_str(&request_id)
        .unwrap_or_else(|_| HeaderValue::from_static("invalid-request-id"));
    request
        .headers_mut()
        .insert(REQUEST_ID_HEADER, id_header.clone());

    let Some(method) = HttpMethod::from_str_ci(request.method().as_str()) else {
        let err = DispatchError::MethodNotAllowed(request.method().to_string());
        warn!(
            request_id = %request_id,
            path = %request.uri().path(),
            error = %err,
            "← rejected"
        );
        return with_request_id(err.into_response(), id_header);
    };

    let Some(path) = canonical_path(request.uri().path()) else {
        let err = DispatchError::RouteNotFound;
        warn!(
            request_id = %request_id,
            path = %request.uri().path(),
            error = %err,
            "← rejected: unparsable path"
        );
        return with_request_id(err.into_response(), id_header);
    };

    let mut ctx = GatewayContext::new(request_view(&request_id, method, path, &request));
    state.access_log.on_request(&mut ctx);

    let response = match run(&state, &mut ctx, request).await {
        Ok(response) => {
            state.access_log.on_response(&ctx, response.status().as_u16());
            response
        }
        Err(err) => {
            state.access_log.on_reject(&ctx, &err);
            err.into_response()
        }
    };
    with_request_id(response, id_header)
}

async fn run(
    state: &AppState,
    ctx: &mut GatewayContext,
    request: Request,
) -> DispatchResult<Response<Body>> {
    // Received
    let route = state
        .routes
        .resolve(&ctx.request.path, &ctx.request.method)
        .ok_or(DispatchError::RouteNotFound)?;
    ctx.route_match = Some(route.clone());

    // Authenticating, Authorizing
    let Some(chain) = state.chain(&route.route_id) else {
        error!(route = %route.route_id, "route has no gate chain; refusing");
        return Err(DispatchError::RouteNotFound);
    };
    chain.run(ctx).await?;

    // Forwarding
    let forwarder = state.upstreams.lookup(&route.upstream_id).ok_or_else(|| {
        DispatchError::UpstreamUnavailable {
            upstream_id: route.upstream_id.clone(),
            reason: "no forwarder registered".to_string(),
        }
    })?;
    forwarder.forward(&ctx.request, request, &route).await
}

/// Metadata view of `request` for the gate chain, keyed on the canonical
/// `path`.
///
/// Header values that are not valid UTF-8 are kept in lossy form so that a
/// present but garbled `Authorization` header is still seen as present.
fn request_view(
    request_id: &str,
    method: HttpMethod,
    path: String,
    request: &Request,
) -> GatewayRequest {
    let mut view = GatewayRequest::new(request_id, path, method);
    if let Some(query) = request.uri().query() {
        view = view.with_query(query);
    }
    for (name, value) in request.headers() {
        view = view.with_header(name.as_str(), String::from_utf8_lossy(value.as_bytes()));
    }
    view
}

fn with_request_id(mut response: Response<Body>, id: HeaderValue) -> Response<Body> {
    response.headers_mut().insert(REQUEST_ID_HEADER, id);
    response
}
