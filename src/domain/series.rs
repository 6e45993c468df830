// Series builder - aligns channel series into composite chart points
use super::measurement::{ChannelSeries, FieldMap, MeasurementType, MeasurementTypeId};
use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::Serialize;
use thiserror::Error;

/// Display format of composite point timestamps
pub const DISPLAY_FORMAT: &str = "%d/%m/%y - %H:%M";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SeriesError {
    #[error("no channel series supplied")]
    InvalidInput,
    #[error("reading {index} of measurement type {measurement_type_id} is malformed: {reason}")]
    MalformedData {
        measurement_type_id: MeasurementTypeId,
        index: usize,
        reason: &'static str,
    },
}

/// One time-aligned sample combining every channel at the same index
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositePoint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip)]
    pub instant: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axial_acceleration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radial_acceleration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tangential_acceleration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_run_time: Option<f64>,
}

impl CompositePoint {
    pub fn get(&self, field: MeasurementType) -> Option<f64> {
        match field {
            MeasurementType::AxialAcceleration => self.axial_acceleration,
            MeasurementType::RadialAcceleration => self.radial_acceleration,
            MeasurementType::TangentialAcceleration => self.tangential_acceleration,
            MeasurementType::RunTime => self.run_time,
            MeasurementType::TotalRunTime => self.total_run_time,
        }
    }

    fn set(&mut self, field: MeasurementType, value: f64) {
        let slot = match field {
            MeasurementType::AxialAcceleration => &mut self.axial_acceleration,
            MeasurementType::RadialAcceleration => &mut self.radial_acceleration,
            MeasurementType::TangentialAcceleration => &mut self.tangential_acceleration,
            MeasurementType::RunTime => &mut self.run_time,
            MeasurementType::TotalRunTime => &mut self.total_run_time,
        };
        *slot = Some(value);
    }

    /// True when no channel contributed to this point
    pub fn is_empty(&self) -> bool {
        self.timestamp.is_none() && MeasurementType::ALL.iter().all(|f| self.get(*f).is_none())
    }
}

/// Builds composite points by index: point `i` combines the `i`-th reading
/// of every channel, and the shortest channel bounds the output length.
#[derive(Debug, Clone)]
pub struct SeriesBuilder {
    fields: FieldMap,
    timeline: MeasurementTypeId,
    display_offset: FixedOffset,
}

impl Default for SeriesBuilder {
    fn default() -> Self {
        Self::new(FieldMap::default())
    }
}

impl SeriesBuilder {
    pub fn new(fields: FieldMap) -> Self {
        Self {
            fields,
            timeline: MeasurementType::AxialAcceleration.code(),
            display_offset: Utc.fix(),
        }
    }

    /// Channel whose readings supply the point timestamps
    pub fn with_timeline(mut self, timeline: MeasurementTypeId) -> Self {
        self.timeline = timeline;
        self
    }

    pub fn with_display_offset(mut self, offset: FixedOffset) -> Self {
        self.display_offset = offset;
        self
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    pub fn timeline(&self) -> MeasurementTypeId {
        self.timeline
    }

    pub fn format_timestamp(&self, instant: DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.display_offset)
            .format(DISPLAY_FORMAT)
            .to_string()
    }

    pub fn build(&self, channels: &[ChannelSeries]) -> Result<Vec<CompositePoint>, SeriesError> {
        let len = channels
            .iter()
            .map(|c| c.readings.len())
            .min()
            .ok_or(SeriesError::InvalidInput)?;

        for channel in channels {
            let code = channel.measurement_type_id();
            if code != self.timeline && self.fields.get(code).is_none() {
                tracing::debug!("Dropping channel with unrecognised measurement type {}", code);
            }
        }

        let mut points = Vec::with_capacity(len);
        for index in 0..len {
            let mut point = CompositePoint::default();

            for channel in channels {
                let code = channel.measurement_type_id();
                let reading = &channel.readings[index];
                let malformed = |reason| SeriesError::MalformedData {
                    measurement_type_id: code,
                    index,
                    reason,
                };

                if code == self.timeline {
                    let instant = match &reading.timestamp {
                        None => return Err(malformed("missing timestamp")),
                        Some(raw) => raw.to_utc().ok_or_else(|| malformed("unparsable timestamp"))?,
                    };
                    point.timestamp = Some(self.format_timestamp(instant));
                    point.instant = Some(instant);
                }

                if let Some(field) = self.fields.get(code) {
                    let value = reading.value.ok_or_else(|| malformed("missing value"))?;
                    point.set(field, value);
                }
            }

            points.push(point);
        }

        tracing::trace!(
            "Built {} composite points from {} channels",
            points.len(),
            channels.len()
        );

        Ok(points)
    }
}
