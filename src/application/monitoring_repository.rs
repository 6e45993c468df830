// Repository trait for condition-monitoring data access
use crate::domain::asset::{MotionAsset, Site};
use crate::domain::measurement::AssetMeasurements;
use crate::domain::window::MeasurementWindow;
use async_trait::async_trait;

#[async_trait]
pub trait MonitoringRepository: Send + Sync {
    /// List the sites visible to the configured account
    async fn list_sites(&self) -> anyhow::Result<Vec<Site>>;

    /// List the motion assets installed at a site
    async fn list_assets(&self, site_id: &str) -> anyhow::Result<Vec<MotionAsset>>;

    /// Fetch every tracked channel of an asset over a window.
    /// Returns `None` when the API has no data for the asset.
    async fn asset_measurements(
        &self,
        asset_id: &str,
        window: &MeasurementWindow,
    ) -> anyhow::Result<Option<AssetMeasurements>>;
}
