// Measurement domain models: raw channel series and measurement type codes
use super::lenient;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Numeric code identifying the physical quantity a channel records
pub type MeasurementTypeId = i64;

const NAIVE_TIMESTAMP: &str = "%Y-%m-%dT%H:%M:%S";

/// Channels the dashboard knows how to chart.
///
/// Each variant is also the composite point field its readings land in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MeasurementType {
    AxialAcceleration,
    RadialAcceleration,
    TangentialAcceleration,
    RunTime,
    TotalRunTime,
}

impl MeasurementType {
    pub const ALL: [MeasurementType; 5] = [
        MeasurementType::AxialAcceleration,
        MeasurementType::RadialAcceleration,
        MeasurementType::TangentialAcceleration,
        MeasurementType::RunTime,
        MeasurementType::TotalRunTime,
    ];

    /// Code used by the monitoring API
    pub fn code(self) -> MeasurementTypeId {
        match self {
            MeasurementType::AxialAcceleration => 31,
            MeasurementType::RadialAcceleration => 32,
            MeasurementType::TangentialAcceleration => 33,
            MeasurementType::RunTime => 209,
            MeasurementType::TotalRunTime => 297,
        }
    }

    pub fn from_code(code: MeasurementTypeId) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }
}

/// Lookup table from measurement type code to output field.
///
/// Codes missing from the table are dropped by the series builder.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMap {
    fields: HashMap<MeasurementTypeId, MeasurementType>,
}

impl FieldMap {
    pub fn empty() -> Self {
        Self {
            fields: HashMap::new(),
        }
    }

    pub fn with(mut self, code: MeasurementTypeId, field: MeasurementType) -> Self {
        self.insert(code, field);
        self
    }

    pub fn insert(&mut self, code: MeasurementTypeId, field: MeasurementType) {
        self.fields.insert(code, field);
    }

    pub fn get(&self, code: MeasurementTypeId) -> Option<MeasurementType> {
        self.fields.get(&code).copied()
    }

    pub fn codes(&self) -> Vec<MeasurementTypeId> {
        let mut codes: Vec<_> = self.fields.keys().copied().collect();
        codes.sort_unstable();
        codes
    }
}

impl Default for FieldMap {
    fn default() -> Self {
        MeasurementType::ALL
            .into_iter()
            .fold(Self::empty(), |map, t| map.with(t.code(), t))
    }
}

/// Reading timestamp as sent on the wire: a date string or epoch milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Millis(i64),
    FractionalMillis(f64),
    Text(String),
}

impl RawTimestamp {
    /// Parse into a UTC instant.
    /// Strings without an offset are read as UTC.
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        match self {
            RawTimestamp::Millis(ms) => DateTime::from_timestamp_millis(*ms),
            RawTimestamp::FractionalMillis(ms) => {
                let ms = ms.round();
                // 2^63 is exactly representable; anything at or past it overflows i64
                if !ms.is_finite() || ms < i64::MIN as f64 || ms >= i64::MAX as f64 {
                    return None;
                }
                DateTime::from_timestamp_millis(ms as i64)
            }
            RawTimestamp::Text(text) => DateTime::parse_from_rfc3339(text)
                .map(|t| t.with_timezone(&Utc))
                .ok()
                .or_else(|| {
                    NaiveDateTime::parse_from_str(text, NAIVE_TIMESTAMP)
                        .ok()
                        .map(|t| t.and_utc())
                }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    #[serde(default)]
    pub timestamp: Option<RawTimestamp>,
    #[serde(default, deserialize_with = "lenient::optional_number")]
    pub value: Option<f64>,
}

impl Reading {
    pub fn new(instant: DateTime<Utc>, value: f64) -> Self {
        Self {
            timestamp: Some(RawTimestamp::Millis(instant.timestamp_millis())),
            value: Some(value),
        }
    }

    pub fn instant(&self) -> Option<DateTime<Utc>> {
        self.timestamp.as_ref().and_then(RawTimestamp::to_utc)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelInfo {
    #[serde(deserialize_with = "lenient::integer")]
    pub measurement_type_id: MeasurementTypeId,
    #[serde(default)]
    pub measurement_type_name: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

/// One sensor channel's recorded data, ordered by timestamp
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelSeries {
    pub info: ChannelInfo,
    #[serde(rename = "data", default)]
    pub readings: Vec<Reading>,
}

impl ChannelSeries {
    pub fn new(measurement_type_id: MeasurementTypeId, readings: Vec<Reading>) -> Self {
        Self {
            info: ChannelInfo {
                measurement_type_id,
                ..ChannelInfo::default()
            },
            readings,
        }
    }

    pub fn measurement_type_id(&self) -> MeasurementTypeId {
        self.info.measurement_type_id
    }
}

/// All channels recorded for one asset over a window
#[derive(Debug, Clone)]
pub struct AssetMeasurements {
    pub asset_id: String,
    pub asset_name: String,
    pub channels: Vec<ChannelSeries>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_codes_round_trip_through_enum() {
        assert_eq!(MeasurementType::from_code(31), Some(MeasurementType::AxialAcceleration));
        assert_eq!(MeasurementType::from_code(209), Some(MeasurementType::RunTime));
        assert_eq!(MeasurementType::from_code(999), None);
    }

    #[test]
    fn test_default_field_map() {
        let map = FieldMap::default();
        assert_eq!(map.codes(), vec![31, 32, 33, 209, 297]);
        assert_eq!(map.get(33), Some(MeasurementType::TangentialAcceleration));
        assert_eq!(map.get(8), None);
    }

    #[test]
    fn test_field_map_extension_is_data_only() {
        let map = FieldMap::default().with(8, MeasurementType::RadialAcceleration);
        assert_eq!(map.get(8), Some(MeasurementType::RadialAcceleration));
    }

    #[test]
    fn test_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2020, 6, 11, 8, 34, 38).unwrap();

        let rfc = RawTimestamp::Text("2020-06-11T08:34:38+00:00".to_string());
        assert_eq!(rfc.to_utc(), Some(expected));

        let offset = RawTimestamp::Text("2020-06-11T10:34:38+02:00".to_string());
        assert_eq!(offset.to_utc(), Some(expected));

        let naive = RawTimestamp::Text("2020-06-11T08:34:38".to_string());
        assert_eq!(naive.to_utc(), Some(expected));

        let millis = RawTimestamp::Millis(expected.timestamp_millis());
        assert_eq!(millis.to_utc(), Some(expected));

        assert_eq!(RawTimestamp::Text("yesterday".to_string()).to_utc(), None);
    }

    #[test]
    fn test_fractional_millisecond_timestamps() {
        let json = r#"{
            "info": { "measurementTypeId": 31 },
            "data": [
                { "timestamp": 1591864478000.0, "value": 1.0 },
                { "timestamp": 1591864478000.6, "value": 2.0 },
                { "timestamp": 1e300, "value": 3.0 }
            ]
        }"#;

        let series: ChannelSeries = serde_json::from_str(json).unwrap();
        let expected = Utc.with_ymd_and_hms(2020, 6, 11, 8, 34, 38).unwrap();

        assert_eq!(series.readings[0].instant(), Some(expected));
        assert_eq!(
            series.readings[1].instant(),
            Some(expected + chrono::Duration::milliseconds(1))
        );
        assert_eq!(series.readings[2].instant(), None);
    }

    #[test]
    fn test_channel_series_from_json() {
        let json = r#"{
            "info": { "measurementTypeId": "31", "unit": "mm/s RMS" },
            "data": [
                { "timestamp": "2020-06-11T08:34:38+00:00", "value": "0.1150" },
                { "timestamp": 1591864600000, "value": 0.3449 },
                { "timestamp": "2020-06-11T08:38:40+00:00" }
            ]
        }"#;

        let series: ChannelSeries = serde_json::from_str(json).unwrap();
        assert_eq!(series.measurement_type_id(), 31);
        assert_eq!(series.info.unit.as_deref(), Some("mm/s RMS"));
        assert_eq!(series.readings.len(), 3);
        assert_eq!(series.readings[0].value, Some(0.115));
        assert_eq!(
            series.readings[1].timestamp,
            Some(RawTimestamp::Millis(1_591_864_600_000))
        );
        assert_eq!(series.readings[2].value, None);
    }
}
