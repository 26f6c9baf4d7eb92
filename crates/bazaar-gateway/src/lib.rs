//! `bazaar-gateway`: the Bazaar API gateway runtime.
//!
//! This crate provides the concrete implementations of the gateway kernel
//! contracts defined in `bazaar-kernel::gateway`:
//!
//! | Kernel contract | Implementation |
//! |----------------|----------------|
//! | [`RouteTable`](gateway::RouteTable) | [`router::PrefixRouter`] |
//! | [`Gate`](gateway::Gate) | [`filter::TokenVerifier`], [`filter::RoleGate`] |
//! | [`UpstreamDescriptor`](gateway::UpstreamDescriptor) | [`backend::ProxyForwarder`] |
//!
//! The [`server::GatewayServer`] wires everything together into an axum HTTP
//! service that authenticates, authorizes and forwards each request.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use bazaar_gateway::config::GatewayServerConfig;
//! use bazaar_gateway::server::GatewayServer;
//!
//! #[tokio::main]
//! async fn main() {
//!     let server = GatewayServer::new(GatewayServerConfig {
//!         port: 5000,
//!         jwt_secret: std::env::var("JWT_SECRET").unwrap_or_default(),
//!         ..Default::default()
//!     });
//!
//!     server.start().await.unwrap();
//! }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

// Re-export the kernel gateway types for convenience.
pub use bazaar_kernel::gateway;
