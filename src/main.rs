mod config;
mod errors;
mod models;
mod routes;
mod service;
mod upstream;

use tracing::info;

use crate::config::Config;
use crate::routes::build_router;
use crate::service::proxy_service::ProxyService;
use crate::upstream::UpstreamClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bareminimum_proxy=debug,tower_http=debug".into()),
        )
        .init();

    // ── Dependency wiring ─────────────────────────────────────────────────────
    let upstream = UpstreamClient::new(&config.upstream_api_url);
    let proxy_service = ProxyService::new(upstream);
    let app = build_router(proxy_service, &config);

    info!(
        "Forwarding to {} (CORS origin {:?}, uploads up to {} bytes)",
        config.upstream_api_url, config.cors_allowed_origin, config.max_upload_bytes
    );

    // ── Listen ────────────────────────────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    info!("Listening on http://{}/", config.bind_address);

    axum::serve(listener, app).await?;
    Ok(())
}
