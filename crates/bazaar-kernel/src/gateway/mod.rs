//! Gateway kernel contract.
//!
//! This module defines the *trait interfaces and configuration types* of the
//! Bazaar gateway. No concrete implementations live here; those belong in
//! `bazaar-gateway`.
//!
//! # Architecture mapping
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │              bazaar-kernel  (this module)                   │
//! │  RouteTable trait       Gate trait + GateKind               │
//! │  UpstreamDescriptor     GatewayConfig + validate()          │
//! │  GatewayRequest / GatewayContext / Identity  GatewayError   │
//! └──────────────────────────┬──────────────────────────────────┘
//!                            │  depends on
//! ┌──────────────────────────▼──────────────────────────────────┐
//! │              bazaar-gateway  (runtime crate)                │
//! │  PrefixRouter: impl RouteTable                              │
//! │  TokenVerifier / RoleGate: impl Gate                        │
//! │  ProxyForwarder (reqwest streaming proxy)                   │
//! │  GatewayServer  (axum HTTP server)                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick start
//!
//! ```rust
//! use bazaar_kernel::gateway::{
//!     AuthConfig, GateKind, GatewayConfig, HttpMethod, PathMatch, RouteConfig,
//!     UpstreamDescriptor,
//! };
//!
//! let config = GatewayConfig::new("shop-gateway")
//!     .with_upstream(UpstreamDescriptor::new("product", "http://localhost:5002"))
//!     .with_route(
//!         RouteConfig::new("products-delete", "/products/{id}", "product")
//!             .with_match(PathMatch::Exact)
//!             .with_methods(vec![HttpMethod::Delete])
//!             .with_gate(GateKind::Token)
//!             .with_gate(GateKind::Role("ADMIN".to_string())),
//!     )
//!     .with_auth(AuthConfig::new("change-me"));
//!
//! config.validate().expect("gateway config is valid");
//! ```

pub mod error;
pub mod gate;
pub mod router;
pub mod upstream;
pub mod validation;

// ── Flat re-exports ────────────────────────────────────────────────────────

pub use error::GatewayError;
pub use gate::{Gate, GateAction, GateKind, GateOrder, GateRejection};
pub use router::{PathMatch, RouteConfig, RouteTable};
pub use upstream::UpstreamDescriptor;
pub use validation::{AuthConfig, GatewayConfig};

// types module is pub so implementors in bazaar-gateway can use the structs
pub mod types;
pub use types::{GatewayContext, GatewayRequest, HttpMethod, Identity, RouteMatch};
