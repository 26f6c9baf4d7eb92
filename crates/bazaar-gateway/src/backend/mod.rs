//! Backend module.

mod forwarder;
mod registry;

pub use forwarder::{ProxyForwarder, upstream_client};
pub use registry::UpstreamRegistry;
