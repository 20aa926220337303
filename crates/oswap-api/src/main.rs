//! # oswap-api — Binary Entry Point
//!
//! Starts the Axum HTTP server for the orderswap escrow ledger. See
//! [`oswap_api::config`] for the environment variables it reads.

use metrics_exporter_prometheus::PrometheusBuilder;
use oswap_api::config::AppConfig;
use oswap_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Structured tracing; LOG_FORMAT=json switches to JSON lines.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("configuration error: {e}");
        e
    })?;
    let port = config.port;
    tracing::info!(?config, "configuration loaded");

    let metrics = PrometheusBuilder::new().install_recorder()?;

    let state = AppState::from_config(config)
        .map_err(|e| {
            tracing::error!("startup failed: {e}");
            e
        })?
        .with_metrics(metrics);

    let app = oswap_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("orderswap API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
