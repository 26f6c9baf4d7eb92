//! Bazaar API gateway binary.
//!
//! Loads `.env`, reads configuration (see [`bazaar_gateway::config`]) and
//! starts the axum-based HTTP gateway.
//!
//! Set `GATEWAY_LOG_FORMAT=json` for JSON log lines; `RUST_LOG` refines the
//! default `bazaar_gateway=info` filter.

use bazaar_gateway::config::GatewayServerConfig;
use bazaar_gateway::server::GatewayServer;
use eyre::WrapErr;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // A missing .env file is normal outside development.
    let dotenv = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bazaar_gateway=info,tower_http=info"));
    let json = std::env::var("GATEWAY_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    if let Ok(path) = &dotenv {
        info!(path = %path.display(), "loaded environment file");
    }

    let config = GatewayServerConfig::load().wrap_err("failed to load gateway configuration")?;
    config
        .gateway_config()
        .validate()
        .wrap_err("invalid gateway configuration (is JWT_SECRET set?)")?;

    info!(
        port = config.port,
        auth_service = %config.auth_service_url,
        product_service = %config.product_service_url,
        admin_role = %config.admin_role,
        "Bazaar gateway configuration loaded"
    );

    GatewayServer::new(config)
        .start()
        .await
        .wrap_err("gateway terminated with an error")
}
