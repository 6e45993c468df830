use crate::domain::measurement::{FieldMap, MeasurementType, MeasurementTypeId};
use crate::domain::series::SeriesBuilder;
use anyhow::Context;
use chrono::FixedOffset;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerSettings,
    pub api: ApiSettings,
    #[serde(default)]
    pub series: SeriesSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub client_id: String,
    pub secret: String,
    #[serde(default = "default_base_api")]
    pub base_api: u32,
}

fn default_base_api() -> u32 {
    1
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SeriesSettings {
    /// Channel whose timestamps label the composite points
    pub timeline_type_id: MeasurementTypeId,
    pub display_utc_offset_minutes: i32,
    /// Channels requested from the API
    pub measurement_type_ids: Vec<MeasurementTypeId>,
}

impl Default for SeriesSettings {
    fn default() -> Self {
        Self {
            timeline_type_id: MeasurementType::AxialAcceleration.code(),
            display_utc_offset_minutes: 0,
            measurement_type_ids: FieldMap::default().codes(),
        }
    }
}

impl SeriesSettings {
    pub fn display_offset(&self) -> anyhow::Result<FixedOffset> {
        self.display_utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .with_context(|| {
                format!(
                    "display_utc_offset_minutes {} is out of range",
                    self.display_utc_offset_minutes
                )
            })
    }

    pub fn series_builder(&self) -> anyhow::Result<SeriesBuilder> {
        Ok(SeriesBuilder::new(FieldMap::default())
            .with_timeline(self.timeline_type_id)
            .with_display_offset(self.display_offset()?))
    }
}

/// Load `config/service.*`, overridden by `ASSET_TELEMETRY__*` variables
pub fn load_service_config() -> anyhow::Result<ServiceConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/service").required(false))
        .add_source(config::Environment::with_prefix("ASSET_TELEMETRY").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> anyhow::Result<ServiceConfig> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    #[test]
    fn test_defaults() {
        let config = parse(
            r#"
            [api]
            base_url = "https://api.example.com"
            client_id = "user"
            secret = "pass"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.api.base_api, 1);
        assert_eq!(config.series.timeline_type_id, 31);
        assert_eq!(config.series.measurement_type_ids, vec![31, 32, 33, 209, 297]);
    }

    #[test]
    fn test_series_settings() {
        let config = parse(
            r#"
            [api]
            base_url = "https://api.example.com"
            client_id = "user"
            secret = "pass"

            [series]
            timeline_type_id = 209
            display_utc_offset_minutes = 60
            measurement_type_ids = [31, 209]
            "#,
        )
        .unwrap();

        let builder = config.series.series_builder().unwrap();
        assert_eq!(builder.timeline(), 209);
        assert_eq!(config.series.display_offset().unwrap().local_minus_utc(), 3600);
        assert_eq!(config.series.measurement_type_ids, vec![31, 209]);
    }

    #[test]
    fn test_offset_out_of_range() {
        let settings = SeriesSettings {
            display_utc_offset_minutes: 24 * 60,
            ..SeriesSettings::default()
        };
        assert!(settings.series_builder().is_err());
    }

    #[test]
    fn test_offset_overflowing_seconds() {
        let settings = SeriesSettings {
            display_utc_offset_minutes: i32::MAX,
            ..SeriesSettings::default()
        };
        assert!(settings.display_offset().is_err());
    }

    #[test]
    fn test_missing_api_section() {
        assert!(parse("[server]\nbind = \"127.0.0.1:9000\"").is_err());
    }
}
