// Main entry point - Dependency injection and server setup
use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use asset_telemetry::application::asset_service::AssetService;
use asset_telemetry::infrastructure::config::load_service_config;
use asset_telemetry::infrastructure::motion_api::MotionApiClient;
use asset_telemetry::presentation::app_state::AppState;
use asset_telemetry::presentation::router::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_service_config().context("Failed to load service configuration")?;
    let builder = config.series.series_builder()?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(MotionApiClient::new(
        &config.api,
        config.series.measurement_type_ids.clone(),
    ));

    // Create services (application layer)
    let asset_service = AssetService::new(repository, builder);
    let state = Arc::new(AppState { asset_service });

    // Build router (presentation layer)
    let router = build_router(state);

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind))?;
    tracing::info!("Starting asset-telemetry service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
