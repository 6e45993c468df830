// HTTP request handlers
use crate::application::asset_service::ServiceError;
use crate::domain::asset::{AssetReport, MotionAsset, Site};
use crate::domain::series::SeriesError;
use crate::domain::window::MeasurementWindow;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl RangeQuery {
    fn window(&self) -> Result<Option<MeasurementWindow>, ApiFailure> {
        match (self.from, self.to) {
            (None, None) => Ok(None),
            (Some(from), Some(to)) => MeasurementWindow::days(from, to)
                .map(Some)
                .map_err(|e| ApiFailure::bad_request(e.to_string())),
            _ => Err(ApiFailure::bad_request(
                "both `from` and `to` must be given".to_string(),
            )),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SitesResponse {
    pub sites: Vec<Site>,
}

#[derive(Debug, Serialize)]
pub struct AssetsResponse {
    pub assets: Vec<MotionAsset>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiFailure {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiFailure {
    fn bad_request(message: String) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                error: "INVALID_INPUT",
                message,
            },
        }
    }

    fn upstream(error: anyhow::Error) -> Self {
        tracing::error!("Monitoring API request failed: {:#}", error);
        Self {
            status: StatusCode::BAD_GATEWAY,
            body: ErrorBody {
                error: "UPSTREAM_ERROR",
                message: error.to_string(),
            },
        }
    }
}

impl From<ServiceError> for ApiFailure {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::NotFound(_) => Self {
                status: StatusCode::NOT_FOUND,
                body: ErrorBody {
                    error: "NOT_FOUND",
                    message: error.to_string(),
                },
            },
            ServiceError::Series(SeriesError::InvalidInput) => Self::bad_request(error.to_string()),
            ServiceError::Series(SeriesError::MalformedData { .. }) => {
                tracing::warn!("Rejecting malformed measurements: {}", error);
                Self {
                    status: StatusCode::BAD_GATEWAY,
                    body: ErrorBody {
                        error: "MALFORMED_DATA",
                        message: error.to_string(),
                    },
                }
            }
            ServiceError::Upstream(e) => Self::upstream(e),
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// List the sites of the configured account
pub async fn list_sites(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SitesResponse>, ApiFailure> {
    let sites = state
        .asset_service
        .list_sites()
        .await
        .map_err(ApiFailure::upstream)?;
    Ok(Json(SitesResponse { sites }))
}

/// List the assets installed at a site
pub async fn list_site_assets(
    Path(site_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<AssetsResponse>, ApiFailure> {
    let assets = state
        .asset_service
        .list_assets(&site_id)
        .await
        .map_err(ApiFailure::upstream)?;
    Ok(Json(AssetsResponse { assets }))
}

/// Chart points and summary table for one asset
pub async fn asset_report(
    Path((site_id, asset_id)): Path<(String, String)>,
    Query(query): Query<RangeQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<AssetReport>, ApiFailure> {
    let window = query.window()?;
    let report = state
        .asset_service
        .asset_report(&site_id, &asset_id, window)
        .await?;
    Ok(Json(report))
}
