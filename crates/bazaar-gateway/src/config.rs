//! Process configuration.
//!
//! Values are layered, later sources overriding earlier ones:
//!
//! 1. built-in defaults;
//! 2. the file named by `GATEWAY_CONFIG` (any format the kernel loader
//!    understands, with `${VAR}` substitution);
//! 3. individual environment variables.
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `GATEWAY_PORT` | `port` | `5000` |
//! | `JWT_SECRET` | `jwt_secret` | *(required)* |
//! | `JWT_REQUIRE_EXP` | `require_expiry` | `false` |
//! | `JWT_LEEWAY_SECS` | `leeway_secs` | `0` |
//! | `ADMIN_ROLE` | `admin_role` | `ADMIN` |
//! | `AUTH_SERVICE_URL` | `auth_service_url` | `http://localhost:5001` |
//! | `PRODUCT_SERVICE_URL` | `product_service_url` | `http://localhost:5002` |
//! | `UPSTREAM_CONNECT_TIMEOUT_MS` | `connect_timeout_ms` | `5000` |
//! | `UPSTREAM_TIMEOUT_MS` | `upstream_timeout_ms` | `30000` |
//! | `UPSTREAM_READ_TIMEOUT_MS` | `read_timeout_ms` | `60000` |

use bazaar_kernel::config::{ConfigError, load_config};
use bazaar_kernel::gateway::{
    AuthConfig, GateKind, GatewayConfig, HttpMethod, PathMatch, RouteConfig, UpstreamDescriptor,
};
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Environment variable naming an optional configuration file.
pub const CONFIG_PATH_VAR: &str = "GATEWAY_CONFIG";

pub const AUTH_UPSTREAM: &str = "auth";
pub const PRODUCT_UPSTREAM: &str = "product";

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to load {path}: {source}")]
    File {
        path: String,
        #[source]
        source: ConfigError,
    },

    #[error("environment variable {name} has invalid value '{value}'")]
    InvalidVar { name: &'static str, value: String },
}

/// Runtime configuration for [`GatewayServer`](crate::server::GatewayServer).
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct GatewayServerConfig {
    /// TCP port to listen on.
    pub port: u16,
    /// HMAC secret shared with the auth service.
    pub jwt_secret: String,
    pub require_expiry: bool,
    pub leeway_secs: u64,
    /// Role required to delete products.
    pub admin_role: String,
    pub auth_service_url: String,
    pub product_service_url: String,
    pub connect_timeout_ms: u64,
    /// Deadline for upstream response headers.
    pub upstream_timeout_ms: u64,
    /// Idle timeout between upstream body reads; `0` disables it.
    pub read_timeout_ms: u64,
}

impl Default for GatewayServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            jwt_secret: String::new(),
            require_expiry: false,
            leeway_secs: 0,
            admin_role: "ADMIN".to_string(),
            auth_service_url: "http://localhost:5001".to_string(),
            product_service_url: "http://localhost:5002".to_string(),
            connect_timeout_ms: 5_000,
            upstream_timeout_ms: 30_000,
            read_timeout_ms: 60_000,
        }
    }
}

impl fmt::Debug for GatewayServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayServerConfig")
            .field("port", &self.port)
            .field("jwt_secret", &"[REDACTED]")
            .field("require_expiry", &self.require_expiry)
            .field("leeway_secs", &self.leeway_secs)
            .field("admin_role", &self.admin_role)
            .field("auth_service_url", &self.auth_service_url)
            .field("product_service_url", &self.product_service_url)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .field("upstream_timeout_ms", &self.upstream_timeout_ms)
            .field("read_timeout_ms", &self.read_timeout_ms)
            .finish()
    }
}

impl GatewayServerConfig {
    /// Load from `GATEWAY_CONFIG` (if set) and the process environment.
    pub fn load() -> Result<Self, ConfigLoadError> {
        let mut config = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Load from a configuration file; absent keys keep their defaults.
    pub fn from_file(path: &str) -> Result<Self, ConfigLoadError> {
        load_config(path).map_err(|source| ConfigLoadError::File {
            path: path.to_string(),
            source,
        })
    }

    /// Apply overrides from a variable lookup, usually the environment.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigLoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = var("GATEWAY_PORT") {
            self.port = parse("GATEWAY_PORT", v)?;
        }
        if let Some(v) = var("JWT_SECRET") {
            self.jwt_secret = v;
        }
        if let Some(v) = var("JWT_REQUIRE_EXP") {
            self.require_expiry = parse_bool("JWT_REQUIRE_EXP", v)?;
        }
        if let Some(v) = var("JWT_LEEWAY_SECS") {
            self.leeway_secs = parse("JWT_LEEWAY_SECS", v)?;
        }
        if let Some(v) = var("ADMIN_ROLE") {
            self.admin_role = v;
        }
        if let Some(v) = var("AUTH_SERVICE_URL") {
            self.auth_service_url = v;
        }
        if let Some(v) = var("PRODUCT_SERVICE_URL") {
            self.product_service_url = v;
        }
        if let Some(v) = var("UPSTREAM_CONNECT_TIMEOUT_MS") {
            self.connect_timeout_ms = parse("UPSTREAM_CONNECT_TIMEOUT_MS", v)?;
        }
        if let Some(v) = var("UPSTREAM_TIMEOUT_MS") {
            self.upstream_timeout_ms = parse("UPSTREAM_TIMEOUT_MS", v)?;
        }
        if let Some(v) = var("UPSTREAM_READ_TIMEOUT_MS") {
            self.read_timeout_ms = parse("UPSTREAM_READ_TIMEOUT_MS", v)?;
        }
        Ok(())
    }

    /// The gateway's route table and upstreams.
    ///
    /// ```text
    /// ANY     /auth/*         open            → auth
    /// DELETE  /products/{id}  token + admin   → product
    /// ANY     /products*      token           → product
    /// ```
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig::new("bazaar-gateway")
            .with_upstream(UpstreamDescriptor::new(AUTH_UPSTREAM, &self.auth_service_url))
            .with_upstream(UpstreamDescriptor::new(
                PRODUCT_UPSTREAM,
                &self.product_service_url,
            ))
            .with_route(RouteConfig::new("auth", "/auth", AUTH_UPSTREAM))
            .with_route(
                RouteConfig::new("products-delete", "/products/{id}", PRODUCT_UPSTREAM)
                    .with_match(PathMatch::Exact)
                    .with_methods(vec![HttpMethod::Delete])
                    .with_gate(GateKind::Token)
                    .with_gate(GateKind::Role(self.admin_role.clone())),
            )
            .with_route(
                RouteConfig::new("products", "/products", PRODUCT_UPSTREAM)
                    .with_gate(GateKind::Token),
            )
            .with_auth(
                AuthConfig::new(&self.jwt_secret)
                    .with_require_expiry(self.require_expiry)
                    .with_leeway_secs(self.leeway_secs),
            )
            .with_timeout_ms(self.upstream_timeout_ms)
            .with_connect_timeout_ms(self.connect_timeout_ms)
            .with_read_timeout_ms(self.read_timeout_ms)
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigLoadError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigLoadError::InvalidVar { name, value })
}

fn parse_bool(name: &'static str, value: String) -> Result<bool, ConfigLoadError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigLoadError::InvalidVar { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_kernel::gateway::GatewayError;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_match_the_deployed_topology() {
        let cfg = GatewayServerConfig::default();
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.admin_role, "ADMIN");
        assert_eq!(cfg.auth_service_url, "http://localhost:5001");
        assert_eq!(cfg.product_service_url, "http://localhost:5002");
        assert!(!cfg.require_expiry);
    }

    #[test]
    fn env_overrides_apply() {
        let mut cfg = GatewayServerConfig::default();
        cfg.apply_overrides(env(&[
            ("GATEWAY_PORT", "8080"),
            ("JWT_SECRET", "s3cret"),
            ("JWT_REQUIRE_EXP", "true"),
            ("PRODUCT_SERVICE_URL", "http://catalog:9000"),
            ("UPSTREAM_TIMEOUT_MS", "1500"),
        ]))
        .unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.jwt_secret, "s3cret");
        assert!(cfg.require_expiry);
        assert_eq!(cfg.product_service_url, "http://catalog:9000");
        assert_eq!(cfg.upstream_timeout_ms, 1500);
        assert_eq!(cfg.auth_service_url, "http://localhost:5001");
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut cfg = GatewayServerConfig::default();
        cfg.apply_overrides(env(&[("GATEWAY_PORT", " ")])).unwrap();
        assert_eq!(cfg.port, 5000);
    }

    #[test]
    fn bad_port_is_reported_by_name() {
        let mut cfg = GatewayServerConfig::default();
        let err = cfg
            .apply_overrides(env(&[("GATEWAY_PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigLoadError::InvalidVar { name: "GATEWAY_PORT", .. }
        ));
    }

    #[test]
    fn file_values_fill_in_over_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "port = 7000\njwt_secret = \"from-file\"\nadmin_role = \"OWNER\"").unwrap();

        let cfg = GatewayServerConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(cfg.port, 7000);
        assert_eq!(cfg.jwt_secret, "from-file");
        assert_eq!(cfg.admin_role, "OWNER");
        assert_eq!(cfg.upstream_timeout_ms, 30_000);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(matches!(
            GatewayServerConfig::from_file("/nonexistent/gateway.yaml"),
            Err(ConfigLoadError::File { .. })
        ));
    }

    #[test]
    fn gateway_config_is_valid_with_secret() {
        let cfg = GatewayServerConfig {
            jwt_secret: "s3cret".to_string(),
            ..Default::default()
        };
        let gw = cfg.gateway_config();
        assert!(gw.validate().is_ok());
        assert_eq!(gw.routes.len(), 3);
        assert_eq!(gw.request_timeout_ms, 30_000);
    }

    #[test]
    fn gateway_config_without_secret_is_rejected() {
        let gw = GatewayServerConfig::default().gateway_config();
        assert_eq!(
            gw.validate(),
            Err(GatewayError::InvalidAuthConfig("secret".to_string()))
        );
    }

    #[test]
    fn admin_route_uses_configured_role() {
        let cfg = GatewayServerConfig {
            jwt_secret: "s".to_string(),
            admin_role: "OWNER".to_string(),
            ..Default::default()
        };
        let gw = cfg.gateway_config();
        let delete = gw.routes.iter().find(|r| r.id == "products-delete").unwrap();
        assert!(delete.requires(&GateKind::Role("OWNER".to_string())));
    }

    #[test]
    fn debug_redacts_secret() {
        let cfg = GatewayServerConfig {
            jwt_secret: "hunter2".to_string(),
            ..Default::default()
        };
        assert!(!format!("{cfg:?}").contains("hunter2"));
    }
}
