// Asset service - Use cases behind the site, asset and report pages
use crate::application::monitoring_repository::MonitoringRepository;
use crate::domain::asset::{AssetReport, MotionAsset, ReportAsset, Site};
use crate::domain::report::{covered_period, ReportData};
use crate::domain::series::{SeriesBuilder, SeriesError};
use crate::domain::window::MeasurementWindow;
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("no measurements available for asset {0}")]
    NotFound(String),
    #[error(transparent)]
    Series(#[from] SeriesError),
    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

#[derive(Clone)]
pub struct AssetService {
    repository: Arc<dyn MonitoringRepository>,
    builder: SeriesBuilder,
}

impl AssetService {
    pub fn new(repository: Arc<dyn MonitoringRepository>, builder: SeriesBuilder) -> Self {
        Self {
            repository,
            builder,
        }
    }

    pub async fn list_sites(&self) -> anyhow::Result<Vec<Site>> {
        let mut sites = self.repository.list_sites().await?;
        sites.sort_by(|a, b| a.site_name.cmp(&b.site_name));
        Ok(sites)
    }

    pub async fn list_assets(&self, site_id: &str) -> anyhow::Result<Vec<MotionAsset>> {
        self.repository.list_assets(site_id).await
    }

    /// Build the chart points and summary of one asset.
    /// Without a window the last complete month is used.
    pub async fn asset_report(
        &self,
        site_id: &str,
        asset_id: &str,
        window: Option<MeasurementWindow>,
    ) -> Result<AssetReport, ServiceError> {
        let window =
            window.unwrap_or_else(|| MeasurementWindow::previous_month(Utc::now().date_naive()));

        let (measurements, assets, sites) = tokio::try_join!(
            self.repository.asset_measurements(asset_id, &window),
            self.repository.list_assets(site_id),
            self.repository.list_sites(),
        )?;
        let measurements = measurements
            .filter(|m| !m.channels.is_empty())
            .ok_or_else(|| ServiceError::NotFound(asset_id.to_string()))?;

        tracing::debug!(
            "Building report for asset {} from {} channels ({} to {})",
            asset_id,
            measurements.channels.len(),
            window.from,
            window.to
        );

        let points = self.builder.build(&measurements.channels)?;
        let report = ReportData::from_points(&points);
        let rows = report.rows();
        let period = covered_period(&points);

        let asset = assets
            .into_iter()
            .find(|a| a.is(asset_id) || a.is(&measurements.asset_id))
            .unwrap_or_else(|| {
                tracing::warn!("Asset {} not listed under site {}", asset_id, site_id);
                MotionAsset::placeholder(&measurements.asset_id, &measurements.asset_name, site_id)
            });
        let site = sites
            .into_iter()
            .find(|s| s.site_id == site_id)
            .unwrap_or_else(|| Site::placeholder(site_id));

        Ok(AssetReport {
            asset: ReportAsset { asset, site },
            start_date: period.map(|(start, _)| start),
            end_date: period.map(|(_, end)| end),
            measurements: points,
            report,
            rows,
        })
    }
}
