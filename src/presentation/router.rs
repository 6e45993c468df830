// Route table
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{asset_report, health_check, list_site_assets, list_sites};
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/api/sites", get(list_sites))
        .route("/api/sites/:site_id/assets", get(list_site_assets))
        .route("/api/sites/:site_id/assets/:asset_id", get(asset_report))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
