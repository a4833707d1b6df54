use anyhow::Context;
use tracing::info;

use gatehouse::Gatekeeper;
use gatehouse::header::{HeaderClientConfig, HeaderIdentityClient};
use gatehouse_core::config::Config;
use gatehouse_core::tracing::init_tracing;

use gatehouse_portal::config::PortalConfig;
use gatehouse_portal::router::build_app;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = PortalConfig::from_env().context("failed to load portal config")?;
    let identity = HeaderClientConfig::from_file(&config.identity_config)
        .with_context(|| format!("failed to load {}", config.identity_config))?;

    let gatekeeper = Gatekeeper::<HeaderIdentityClient>::new();
    let app = build_app(&gatekeeper, identity, &config.install_options())?;

    let addr = format!("0.0.0.0:{}", config.portal_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("portal listening on {addr}");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
