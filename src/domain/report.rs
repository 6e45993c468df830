// Report domain model - monthly summary of an asset's composite points
use super::measurement::MeasurementType;
use super::series::CompositePoint;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Upper bound of the acceptable vibration range, mm/s RMS
pub const VIBRATION_LIMIT: f64 = 1.8;

/// Hours in the longest month
pub const MONTH_HOURS: f64 = 24.0 * 31.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    pub max_total_time: Option<f64>,
    /// Sum of run time readings, converted from minutes to hours
    pub tot_run_time: f64,
    pub avg_acc_x: Option<f64>,
    pub avg_acc_y: Option<f64>,
    pub avg_acc_z: Option<f64>,
    pub tvi: f64,
    pub dvi: f64,
}

impl ReportData {
    pub fn from_points(points: &[CompositePoint]) -> Self {
        let values = |field: MeasurementType| points.iter().filter_map(move |p| p.get(field));

        Self {
            max_total_time: values(MeasurementType::TotalRunTime).reduce(f64::max),
            tot_run_time: values(MeasurementType::RunTime).sum::<f64>() / 60.0,
            avg_acc_x: mean(values(MeasurementType::AxialAcceleration)),
            avg_acc_y: mean(values(MeasurementType::RadialAcceleration)),
            avg_acc_z: mean(values(MeasurementType::TangentialAcceleration)),
            // Vibration indices are not computed yet
            tvi: 0.0,
            dvi: 0.0,
        }
    }

    /// Rows of the summary table, in display order
    pub fn rows(&self) -> Vec<ReportRow> {
        vec![
            ReportRow::new("Total working hours", self.max_total_time, 1, None),
            ReportRow::new("Working hours in month", Some(self.tot_run_time), 1, Some(MONTH_HOURS)),
            ReportRow::new("Axial acceleration - mean", self.avg_acc_x, 3, Some(VIBRATION_LIMIT)),
            ReportRow::new("Radial acceleration - mean", self.avg_acc_y, 3, Some(VIBRATION_LIMIT)),
            ReportRow::new(
                "Tangential acceleration - mean",
                self.avg_acc_z,
                3,
                Some(VIBRATION_LIMIT),
            ),
            ReportRow::new("TVI", Some(self.tvi), 1, Some(VIBRATION_LIMIT)),
            ReportRow::new("DVI", Some(self.dvi), 1, None),
        ]
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// First and last instants covered by the points
pub fn covered_period(points: &[CompositePoint]) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let first = points.iter().find_map(|p| p.instant)?;
    let last = points.iter().rev().find_map(|p| p.instant)?;
    Some((first, last))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub label: String,
    pub value: Option<f64>,
    /// Value rendered with `precision` fraction digits
    pub display: Option<String>,
    pub precision: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ReportRow {
    fn new(label: &str, value: Option<f64>, precision: usize, max: Option<f64>) -> Self {
        Self {
            label: label.to_string(),
            value,
            display: value.map(|v| format!("{:.*}", precision, v)),
            precision,
            min: max.map(|_| 0.0),
            max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn point(axial: Option<f64>, run_time: Option<f64>, total: Option<f64>) -> CompositePoint {
        CompositePoint {
            axial_acceleration: axial,
            radial_acceleration: axial.map(|a| a * 2.0),
            run_time,
            total_run_time: total,
            ..CompositePoint::default()
        }
    }

    #[test]
    fn test_report_values() {
        let points = vec![
            point(Some(1.0), Some(60.0), Some(1200.0)),
            point(Some(2.0), Some(30.0), Some(1201.5)),
            point(Some(3.0), Some(90.0), Some(1201.0)),
        ];

        let report = ReportData::from_points(&points);

        assert_eq!(report.max_total_time, Some(1201.5));
        assert_eq!(report.tot_run_time, 3.0);
        assert_eq!(report.avg_acc_x, Some(2.0));
        assert_eq!(report.avg_acc_y, Some(4.0));
        assert_eq!(report.avg_acc_z, None);
        assert_eq!(report.tvi, 0.0);
        assert_eq!(report.dvi, 0.0);
    }

    #[test]
    fn test_report_of_no_points() {
        let report = ReportData::from_points(&[]);
        assert_eq!(report.max_total_time, None);
        assert_eq!(report.tot_run_time, 0.0);
        assert_eq!(report.avg_acc_x, None);
    }

    #[test]
    fn test_rows_follow_summary_table() {
        let report = ReportData::from_points(&[point(Some(0.12345), Some(90.0), None)]);
        let rows = report.rows();

        assert_eq!(rows.len(), 7);
        assert_eq!(rows[0].label, "Total working hours");
        assert_eq!(rows[0].display, None);
        assert_eq!(rows[1].display.as_deref(), Some("1.5"));
        assert_eq!(rows[1].max, Some(744.0));
        assert_eq!(rows[2].display.as_deref(), Some("0.123"));
        assert_eq!(rows[2].min, Some(0.0));
        assert_eq!(rows[2].max, Some(VIBRATION_LIMIT));
        assert_eq!(rows[6].min, None);
    }

    #[test]
    fn test_covered_period_skips_points_without_instant() {
        let start = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2022, 1, 31, 23, 0, 0).unwrap();
        let points = vec![
            CompositePoint::default(),
            CompositePoint {
                instant: Some(start),
                ..CompositePoint::default()
            },
            CompositePoint {
                instant: Some(end),
                ..CompositePoint::default()
            },
            CompositePoint::default(),
        ];

        assert_eq!(covered_period(&points), Some((start, end)));
        assert_eq!(covered_period(&[CompositePoint::default()]), None);
    }
}
