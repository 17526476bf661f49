use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::shared::core::primitives::{local_timestamp, local_timestamp_option, parse_date};

pub const DEFAULT_PURPOSE: &str = "normal";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitLogEntry {
    pub id: Uuid,
    pub visitor_id: Option<i64>,
    pub visitor_code: Option<String>,
    pub visitor_name: String,
    pub pdl_name: String,
    pub cell: String,
    #[serde(with = "local_timestamp")]
    pub time_in: NaiveDateTime,
    #[serde(with = "local_timestamp_option")]
    pub time_out: Option<NaiveDateTime>,
    #[serde(with = "local_timestamp")]
    pub scan_date: NaiveDateTime,
    pub relationship: String,
    pub contact_number: String,
    pub purpose: String,
}

impl VisitLogEntry {
    pub fn is_open(&self) -> bool {
        self.time_out.is_none()
    }

    pub fn open_key(&self) -> OpenKey {
        OpenKey::new(&self.visitor_name, &self.pdl_name, &self.cell)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVisitLogEntry {
    pub visitor_id: Option<i64>,
    pub visitor_code: Option<String>,
    pub visitor_name: String,
    pub pdl_name: String,
    pub cell: String,
    pub time_in: NaiveDateTime,
    pub relationship: String,
    pub contact_number: String,
    pub purpose: String,
}

impl NewVisitLogEntry {
    pub fn open_key(&self) -> OpenKey {
        OpenKey::new(&self.visitor_name, &self.pdl_name, &self.cell)
    }

    pub fn into_entry(self, id: Uuid) -> VisitLogEntry {
        VisitLogEntry {
            id,
            visitor_id: self.visitor_id,
            visitor_code: self.visitor_code,
            visitor_name: self.visitor_name,
            pdl_name: self.pdl_name,
            cell: self.cell,
            time_in: self.time_in,
            time_out: None,
            scan_date: self.time_in,
            relationship: self.relationship,
            contact_number: self.contact_number,
            purpose: self.purpose,
        }
    }
}

/// Case-insensitive (visitor, pdl, cell) triple. At most one open entry may
/// hold a given key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OpenKey {
    pub visitor_name: String,
    pub pdl_name: String,
    pub cell: String,
}

impl OpenKey {
    pub fn new(visitor_name: &str, pdl_name: &str, cell: &str) -> Self {
        Self {
            visitor_name: visitor_name.trim().to_lowercase(),
            pdl_name: pdl_name.trim().to_lowercase(),
            cell: cell.trim().to_lowercase(),
        }
    }
}

pub fn normalize_purpose(purpose: Option<&str>) -> String {
    match purpose.map(str::trim) {
        Some(purpose) if !purpose.is_empty() => purpose.to_string(),
        _ => DEFAULT_PURPOSE.to_string(),
    }
}

/// Inclusive range of `time_in` dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateRangeError {
    #[error("invalid date: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("startDate and endDate must be supplied together")]
    Incomplete,

    #[error("startDate must not be after endDate")]
    Reversed,
}

impl DateRange {
    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn contains(&self, timestamp: &NaiveDateTime) -> bool {
        let date = timestamp.date();
        self.start <= date && date <= self.end
    }

    /// Builds a range from `date` or a `startDate`/`endDate` pair; `Ok(None)`
    /// when no filter was supplied. `date` wins when both forms are present.
    pub fn from_params(
        date: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Option<Self>, DateRangeError> {
        if let Some(date) = present(date) {
            return parse(date).map(|date| Some(Self::single(date)));
        }

        match (present(start_date), present(end_date)) {
            (None, None) => Ok(None),
            (Some(start), Some(end)) => {
                let (start, end) = (parse(start)?, parse(end)?);
                if start > end {
                    return Err(DateRangeError::Reversed);
                }
                Ok(Some(Self { start, end }))
            }
            _ => Err(DateRangeError::Incomplete),
        }
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn parse(value: &str) -> Result<NaiveDate, DateRangeError> {
    parse_date(value).ok_or_else(|| DateRangeError::InvalidDate(value.to_string()))
}

#[cfg(test)]
mod visit_log_entry_tests {
    use super::*;
    use crate::shared::core::primitives::parse_local;
    use rstest::{fixture, rstest};

    #[fixture]
    fn new_entry() -> NewVisitLogEntry {
        NewVisitLogEntry {
            visitor_id: Some(123),
            visitor_code: Some("VIS-25-000123".into()),
            visitor_name: "Juan Dela Cruz".into(),
            pdl_name: "Dela Cruz, Juan".into(),
            cell: "Cell - 1".into(),
            time_in: parse_local("2025-03-01 10:00:00").unwrap(),
            relationship: "Brother".into(),
            contact_number: "09171234567".into(),
            purpose: "conjugal".into(),
        }
    }

    #[rstest]
    fn it_should_open_the_entry_with_scan_date_equal_to_time_in(new_entry: NewVisitLogEntry) {
        let id = Uuid::now_v7();
        let entry = new_entry.clone().into_entry(id);
        assert_eq!(entry.id, id);
        assert!(entry.is_open());
        assert_eq!(entry.scan_date, new_entry.time_in);
        assert_eq!(entry.purpose, "conjugal");
    }

    #[rstest]
    fn it_should_serialize_timestamps_in_local_format(new_entry: NewVisitLogEntry) {
        let entry = new_entry.into_entry(Uuid::now_v7());
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["time_in"], "2025-03-01 10:00:00");
        assert_eq!(json["time_out"], serde_json::Value::Null);
    }

    #[rstest]
    fn it_should_compare_open_keys_case_insensitively(new_entry: NewVisitLogEntry) {
        assert_eq!(
            new_entry.open_key(),
            OpenKey::new(" JUAN DELA CRUZ", "dela cruz, juan", "cell - 1 ")
        );
    }

    #[rstest]
    #[case(None, "normal")]
    #[case(Some(""), "normal")]
    #[case(Some("  "), "normal")]
    #[case(Some(" conjugal "), "conjugal")]
    fn it_should_default_the_purpose(#[case] purpose: Option<&str>, #[case] expected: &str) {
        assert_eq!(normalize_purpose(purpose), expected);
    }

    #[rstest]
    fn it_should_build_date_ranges_from_params() {
        let day = parse_date("2025-03-01").unwrap();
        assert_eq!(DateRange::from_params(None, None, None), Ok(None));
        assert_eq!(
            DateRange::from_params(Some("2025-03-01"), Some("2025-01-01"), None),
            Ok(Some(DateRange::single(day)))
        );
        assert_eq!(
            DateRange::from_params(None, Some("2025-02-01"), Some("2025-03-01")),
            Ok(Some(DateRange {
                start: parse_date("2025-02-01").unwrap(),
                end: day,
            }))
        );
        assert_eq!(
            DateRange::from_params(None, Some("2025-02-01"), None),
            Err(DateRangeError::Incomplete)
        );
        assert_eq!(
            DateRange::from_params(None, Some("2025-03-02"), Some("2025-03-01")),
            Err(DateRangeError::Reversed)
        );
        assert_eq!(
            DateRange::from_params(Some("03/01/2025"), None, None),
            Err(DateRangeError::InvalidDate("03/01/2025".into()))
        );
    }
}
