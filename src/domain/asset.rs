// Site and asset domain models
use super::lenient;
use super::report::{ReportData, ReportRow};
use super::series::CompositePoint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub site_id: String,
    pub site_name: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_number")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_number")]
    pub longitude: Option<f64>,
}

/// A monitored motor, pump or other motion asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotionAsset {
    pub motion_asset_id: String,
    pub asset_id: String,
    pub asset_name: String,
    #[serde(default)]
    pub asset_type_id: Option<String>,
    #[serde(default)]
    pub asset_type: Option<String>,
    #[serde(default)]
    pub asset_family: Option<String>,
    #[serde(default, rename = "baseAPI")]
    pub base_api: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub organization_name: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub site_id: Option<String>,
    #[serde(default)]
    pub site_name: Option<String>,
}

impl Site {
    /// Stand-in for a site the API no longer lists
    pub fn placeholder(site_id: &str) -> Self {
        Self {
            site_id: site_id.to_string(),
            site_name: site_id.to_string(),
            country: None,
            country_code: None,
            address: None,
            city: None,
            latitude: None,
            longitude: None,
        }
    }
}

impl MotionAsset {
    /// Stand-in built from the measurement payload when the asset is missing from its site
    pub fn placeholder(asset_id: &str, asset_name: &str, site_id: &str) -> Self {
        Self {
            motion_asset_id: asset_id.to_string(),
            asset_id: asset_id.to_string(),
            asset_name: asset_name.to_string(),
            asset_type_id: None,
            asset_type: None,
            asset_family: None,
            base_api: None,
            description: None,
            organization_name: None,
            serial_number: None,
            site_id: Some(site_id.to_string()),
            site_name: None,
        }
    }

    pub fn is(&self, id: &str) -> bool {
        self.asset_id == id || self.motion_asset_id == id
    }
}

/// The asset header of a report: asset fields with the owning site nested under `site`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportAsset {
    #[serde(flatten)]
    pub asset: MotionAsset,
    pub site: Site,
}

/// Everything the asset page renders: chart points and summary table
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetReport {
    pub asset: ReportAsset,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub measurements: Vec<CompositePoint>,
    pub report: ReportData,
    pub rows: Vec<ReportRow>,
}
