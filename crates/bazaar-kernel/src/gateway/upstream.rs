//! Upstream service descriptors.
//!
//! An upstream is a backend service reachable at a fixed address known at
//! startup. Routes refer to upstreams by id; the runtime builds one
//! forwarder per descriptor.

use super::error::GatewayError;
use serde::{Deserialize, Serialize};

/// A backend the gateway forwards to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpstreamDescriptor {
    /// Unique stable identifier (must not be empty).
    pub id: String,
    /// Base URL for forwarding (e.g. `http://localhost:5002`). A path
    /// component is prepended to every forwarded path.
    pub endpoint: String,
}

impl UpstreamDescriptor {
    /// Construct a descriptor.
    pub fn new(id: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Basic sanity checks run during [`GatewayConfig::validate()`](super::validation::GatewayConfig::validate).
    pub(crate) fn validate(&self) -> Result<(), GatewayError> {
        if self.id.trim().is_empty() {
            return Err(GatewayError::EmptyUpstreamId);
        }
        if self.endpoint.trim().is_empty() {
            return Err(GatewayError::InvalidEndpoint(
                self.id.clone(),
                "endpoint URI cannot be empty".to_string(),
            ));
        }
        let Some(rest) = self
            .endpoint
            .strip_prefix("http://")
            .or_else(|| self.endpoint.strip_prefix("https://"))
        else {
            return Err(GatewayError::InvalidEndpoint(
                self.id.clone(),
                format!(
                    "endpoint '{}' must start with http:// or https://",
                    self.endpoint
                ),
            ));
        };
        if rest.split('/').next().unwrap_or_default().is_empty() {
            return Err(GatewayError::InvalidEndpoint(
                self.id.clone(),
                format!("endpoint '{}' has no host", self.endpoint),
            ));
        }
        Ok(())
    }
}
