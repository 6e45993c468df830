// Measurement window - time range requested from the monitoring API
use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
#[error("window end {to} is before its start {from}")]
pub struct InvalidWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Half-open range `[from, to)` in the API's naive UTC time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasurementWindow {
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
}

impl MeasurementWindow {
    /// Whole days from `first` to `last`, both included
    pub fn days(first: NaiveDate, last: NaiveDate) -> Result<Self, InvalidWindow> {
        if last < first {
            return Err(InvalidWindow {
                from: first,
                to: last,
            });
        }
        Ok(Self {
            from: first.and_time(NaiveTime::MIN),
            to: (last + Days::new(1)).and_time(NaiveTime::MIN),
        })
    }

    /// The last complete calendar month before `today`
    pub fn previous_month(today: NaiveDate) -> Self {
        let this_month = today - Days::new(u64::from(today.day0()));
        let last_day = this_month - Days::new(1);
        let first_day = last_day - Days::new(u64::from(last_day.day0()));

        Self {
            from: first_day.and_time(NaiveTime::MIN),
            to: this_month.and_time(NaiveTime::MIN),
        }
    }
}
