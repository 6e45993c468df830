// In-memory repository for service and handler tests
use crate::application::monitoring_repository::MonitoringRepository;
use crate::domain::asset::{MotionAsset, Site};
use crate::domain::measurement::{AssetMeasurements, ChannelSeries, Reading};
use crate::domain::window::MeasurementWindow;
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct FakeRepository {
    sites: Vec<Site>,
    assets: Vec<MotionAsset>,
    measurements: Option<AssetMeasurements>,
    fail: bool,
    windows: Arc<Mutex<Vec<MeasurementWindow>>>,
}

impl Default for FakeRepository {
    fn default() -> Self {
        Self {
            sites: vec![site("9AAS491472V5330", "Fertitalia"), site("12440", "Depuratore")],
            assets: vec![asset("12440", "30879", "coclea di ricircolo 4")],
            measurements: None,
            fail: false,
            windows: Arc::default(),
        }
    }
}

impl FakeRepository {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_measurements(mut self, measurements: AssetMeasurements) -> Self {
        self.measurements = Some(measurements);
        self
    }

    pub fn requested_windows(&self) -> Vec<MeasurementWindow> {
        self.windows.lock().unwrap().clone()
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("monitoring API unavailable");
        }
        Ok(())
    }
}

#[async_trait]
impl MonitoringRepository for FakeRepository {
    async fn list_sites(&self) -> anyhow::Result<Vec<Site>> {
        self.check()?;
        Ok(self.sites.clone())
    }

    async fn list_assets(&self, site_id: &str) -> anyhow::Result<Vec<MotionAsset>> {
        self.check()?;
        Ok(self
            .assets
            .iter()
            .filter(|a| a.site_id.as_deref() == Some(site_id))
            .cloned()
            .collect())
    }

    async fn asset_measurements(
        &self,
        _asset_id: &str,
        window: &MeasurementWindow,
    ) -> anyhow::Result<Option<AssetMeasurements>> {
        self.check()?;
        self.windows.lock().unwrap().push(*window);
        Ok(self.measurements.clone())
    }
}

pub fn site(id: &str, name: &str) -> Site {
    Site {
        site_id: id.to_string(),
        site_name: name.to_string(),
        country: Some("ITALY".to_string()),
        country_code: Some("IT".to_string()),
        address: None,
        city: None,
        latitude: None,
        longitude: None,
    }
}

pub fn asset(site_id: &str, asset_id: &str, name: &str) -> MotionAsset {
    MotionAsset {
        motion_asset_id: format!("motion-{}", asset_id),
        asset_id: asset_id.to_string(),
        asset_name: name.to_string(),
        asset_type_id: Some("1".to_string()),
        asset_type: Some("Motor".to_string()),
        asset_family: None,
        base_api: Some(1),
        description: None,
        organization_name: None,
        serial_number: Some("S2A0060302".to_string()),
        site_id: Some(site_id.to_string()),
        site_name: None,
    }
}

/// Two aligned points: axial 1.0/1.5, run time 30/30 minutes
pub fn sample_measurements() -> AssetMeasurements {
    let start = Utc.with_ymd_and_hms(2022, 1, 3, 8, 30, 0).unwrap();
    let series = |code, values: &[f64]| {
        let readings = values
            .iter()
            .enumerate()
            .map(|(i, v)| Reading::new(start + Duration::hours(i as i64), *v))
            .collect();
        ChannelSeries::new(code, readings)
    };

    AssetMeasurements {
        asset_id: "30879".to_string(),
        asset_name: "coclea di ricircolo 4".to_string(),
        channels: vec![
            series(31, &[1.0, 1.5]),
            series(32, &[0.2, 0.3, 0.4]),
            series(209, &[30.0, 30.0]),
        ],
    }
}
