use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use salesdesk_api::config::AppConfig;
use salesdesk_api::platform::RestPlatform;
use salesdesk_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up SUPABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!(
        "Starting SalesDesk API in {:?} mode against {}",
        config.environment,
        config.platform_base_url()
    );
    if config.security.allow_legacy_identity_header {
        if config.is_production() {
            anyhow::bail!("SECURITY_ALLOW_LEGACY_IDENTITY_HEADER must not be enabled in production");
        }
        tracing::warn!("Legacy x-user-email identity header is enabled");
    }

    let platform = RestPlatform::new(&config.platform).context("failed to build platform client")?;
    let addr = SocketAddr::new(config.server.host, config.server.port);
    let state = AppState::new(config, Arc::new(platform));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!("SalesDesk API listening on http://{}", addr);

    axum::serve(listener, salesdesk_api::app(state))
        .await
        .context("server error")
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").map(|v| v == "json").unwrap_or(false);

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
