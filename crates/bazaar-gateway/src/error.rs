//! Gateway error types

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bazaar_kernel::gateway::{GateRejection, GatewayError};
use serde_json::json;
use thiserror::Error;

/// Per-request failures of the dispatch pipeline.
///
/// Every variant renders as a JSON `{"message": ...}` body. The `Display`
/// text is for logs only; clients see the fixed messages from
/// [`DispatchError::client_message`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("no credential supplied")]
    MissingCredential,

    #[error("authorization header is not a bearer credential")]
    MalformedCredential,

    #[error("credential failed verification")]
    InvalidCredential,

    #[error("identity lacks required role '{required_role}'")]
    Forbidden { required_role: String },

    #[error("no route matched")]
    RouteNotFound,

    #[error("method '{0}' is not supported")]
    MethodNotAllowed(String),

    #[error("upstream '{upstream_id}' unavailable: {reason}")]
    UpstreamUnavailable { upstream_id: String, reason: String },

    #[error("upstream '{upstream_id}' timed out")]
    UpstreamTimeout { upstream_id: String },
}

impl DispatchError {
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::MissingCredential => StatusCode::UNAUTHORIZED,
            DispatchError::MalformedCredential
            | DispatchError::InvalidCredential
            | DispatchError::Forbidden { .. } => StatusCode::FORBIDDEN,
            DispatchError::RouteNotFound => StatusCode::NOT_FOUND,
            DispatchError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            DispatchError::UpstreamUnavailable { .. } => StatusCode::BAD_GATEWAY,
            DispatchError::UpstreamTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Message returned to the client. Never contains token contents or
    /// upstream error detail.
    pub fn client_message(&self) -> String {
        match self {
            DispatchError::MissingCredential => "No token provided".to_string(),
            DispatchError::MalformedCredential | DispatchError::InvalidCredential => {
                "Invalid token".to_string()
            }
            DispatchError::Forbidden { required_role } => {
                format!("{} access required", title_case(required_role))
            }
            DispatchError::RouteNotFound => "Route not found".to_string(),
            DispatchError::MethodNotAllowed(_) => "Method not allowed".to_string(),
            DispatchError::UpstreamUnavailable { .. } => {
                "Upstream service unavailable".to_string()
            }
            DispatchError::UpstreamTimeout { .. } => "Upstream service timed out".to_string(),
        }
    }
}

impl From<GateRejection> for DispatchError {
    fn from(rejection: GateRejection) -> Self {
        match rejection {
            GateRejection::MissingCredential => DispatchError::MissingCredential,
            GateRejection::MalformedCredential => DispatchError::MalformedCredential,
            GateRejection::InvalidCredential => DispatchError::InvalidCredential,
            GateRejection::Forbidden { required_role } => {
                DispatchError::Forbidden { required_role }
            }
            // GateRejection is #[non_exhaustive]; unknown refusals fail closed.
            _ => DispatchError::InvalidCredential,
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "message": self.client_message() }));
        (self.status(), body).into_response()
    }
}

/// `ADMIN` → `Admin`, `support_agent` → `Support_agent`.
fn title_case(role: &str) -> String {
    let lower = role.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub type DispatchResult<T> = Result<T, DispatchError>;

/// Failures while assembling or binding the server. Never produced per
/// request.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid gateway configuration: {0}")]
    Config(#[from] GatewayError),

    #[error("failed to build upstream HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("failed to bind listener: {0}")]
    Io(#[from] std::io::Error),
}
