//! Bearer-token verification gate.
//!
//! Accepts requests carrying `Authorization: Bearer <jwt>` signed with the
//! process-wide HMAC secret. The decoded claims become the request's
//! [`Identity`].
//!
//! A missing header is reported separately from a bad one so the dispatcher
//! can answer `401` for the former and `403` for everything else, including
//! expired tokens and tokens whose `nbf` is still in the future.

use async_trait::async_trait;
use bazaar_kernel::gateway::{
    AuthConfig, Gate, GateAction, GateOrder, GateRejection, GatewayContext, Identity,
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Why a credential was refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("authorization header is absent")]
    MissingCredential,
    #[error("authorization header is not `Bearer <token>`")]
    MalformedCredential,
    #[error("token failed verification")]
    InvalidCredential,
}

impl From<AuthError> for GateRejection {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredential => GateRejection::MissingCredential,
            AuthError::MalformedCredential => GateRejection::MalformedCredential,
            AuthError::InvalidCredential => GateRejection::InvalidCredential,
        }
    }
}

/// Token payload as issued by the auth service.
///
/// `role` is mandatory and must be a string; the subject may arrive as
/// `sub` or `id`, as a string or a number.
#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    sub: Option<Value>,
    #[serde(default)]
    id: Option<Value>,
    role: String,
    #[serde(default)]
    exp: Option<u64>,
}

impl Claims {
    fn into_identity(self) -> Option<Identity> {
        let subject = match self.sub.or(self.id)? {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        Some(Identity {
            subject,
            role: self.role,
            expires_at: self.exp,
        })
    }
}

/// Verifies bearer tokens against the shared secret.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Build a verifier from the gateway's auth settings.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.leeway = config.leeway_secs;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();
        if config.require_expiry {
            validation.required_spec_claims.insert("exp".to_string());
        }

        Self {
            key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        }
    }

    /// Verify the raw `Authorization` header value.
    pub fn verify(&self, raw_header: Option<&str>) -> Result<Identity, AuthError> {
        let raw = raw_header
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or(AuthError::MissingCredential)?;

        let (scheme, token) = raw
            .split_once(' ')
            .ok_or(AuthError::MalformedCredential)?;
        let token = token.trim();
        if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
            return Err(AuthError::MalformedCredential);
        }

        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            debug!(kind = ?e.kind(), "token rejected");
            AuthError::InvalidCredential
        })?;

        data.claims
            .into_identity()
            .ok_or(AuthError::InvalidCredential)
    }
}

#[async_trait]
impl Gate for TokenVerifier {
    fn name(&self) -> &str {
        "token"
    }

    fn order(&self) -> GateOrder {
        GateOrder::AUTHENTICATE
    }

    async fn check(&self, ctx: &mut GatewayContext) -> GateAction {
        match self.verify(ctx.request.header("authorization")) {
            Ok(identity) => {
                ctx.identity = Some(identity);
                GateAction::Continue
            }
            Err(err) => {
                warn!(
                    request_id = %ctx.request.id,
                    route = ctx.route_id(),
                    reason = %err,
                    "rejected request: credential"
                );
                GateAction::Reject(err.into())
            }
        }
    }
}
