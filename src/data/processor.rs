//! Data Processor Module
//! Normalizes the optional `date` column to the Polars `Date` type.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;

use super::loader::LoaderError;
use super::table::{date_to_days, DATE_COLUMN};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Handles cleaning steps applied between CSV parsing and aggregation.
pub struct DataProcessor;

impl DataProcessor {
    /// Replace a string `date` column with a `Date` column.
    ///
    /// Null cells stay null. Any other cell that does not parse fails the
    /// whole conversion. Frames without a `date` column pass through untouched.
    pub fn normalize_dates(mut df: DataFrame) -> Result<DataFrame, LoaderError> {
        let Ok(raw) = df.column(DATE_COLUMN) else {
            return Ok(df);
        };

        let raw = raw.cast(&DataType::String)?;
        let mut days: Vec<Option<i32>> = Vec::with_capacity(raw.len());
        for (row, cell) in raw.str()?.into_iter().enumerate() {
            let parsed = match cell {
                None => None,
                Some(text) => {
                    let date = Self::parse_date(text).ok_or_else(|| LoaderError::InvalidDate {
                        row,
                        value: text.to_string(),
                    })?;
                    Some(date_to_days(date))
                }
            };
            days.push(parsed);
        }

        let dates = Column::new(DATE_COLUMN.into(), days).cast(&DataType::Date)?;
        df.with_column(dates)?;
        Ok(df)
    }

    /// Parse a single ISO-8601-style date or datetime, keeping the calendar date.
    ///
    /// Timestamps with a `Z` or numeric offset keep the date as written in
    /// that offset.
    pub fn parse_date(text: &str) -> Option<NaiveDate> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
            .or_else(|| {
                DATETIME_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                    .map(|dt| dt.date())
            })
            .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::table::Table;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_common_date_shapes() {
        assert_eq!(DataProcessor::parse_date("2024-01-05"), Some(ymd(2024, 1, 5)));
        assert_eq!(DataProcessor::parse_date("2024/01/05"), Some(ymd(2024, 1, 5)));
        assert_eq!(DataProcessor::parse_date("20240105"), Some(ymd(2024, 1, 5)));
        assert_eq!(
            DataProcessor::parse_date("2024-01-05T13:45:00"),
            Some(ymd(2024, 1, 5))
        );
        assert_eq!(
            DataProcessor::parse_date(" 2024-01-05 23:59:59.250 "),
            Some(ymd(2024, 1, 5))
        );
    }

    #[test]
    fn parses_minute_precision_and_offset_timestamps() {
        for text in [
            "2024-01-01T10:30:00Z",
            "2024-01-01T10:30:00+02:00",
            "2024-01-01T23:30:00.5-05:00",
            "2024-01-01T10:30",
            "2024-01-01 10:30",
        ] {
            assert_eq!(
                DataProcessor::parse_date(text),
                Some(ymd(2024, 1, 1)),
                "{text}"
            );
        }
    }

    #[test]
    fn rejects_garbage_dates() {
        assert_eq!(DataProcessor::parse_date("yesterday"), None);
        assert_eq!(DataProcessor::parse_date("2024-13-01"), None);
        assert_eq!(DataProcessor::parse_date(""), None);
    }

    #[test]
    fn converts_date_column_and_keeps_nulls() {
        let df = df!(
            "date" => [Some("2024-01-02"), None, Some("2024-01-01")],
            "value" => [1.0, 2.0, 3.0]
        )
        .unwrap();

        let df = DataProcessor::normalize_dates(df).unwrap();
        assert_eq!(df.column("date").unwrap().dtype(), &DataType::Date);

        let dates = Table::new(df).dates().unwrap().unwrap();
        assert_eq!(dates, vec![Some(ymd(2024, 1, 2)), None, Some(ymd(2024, 1, 1))]);
    }

    #[test]
    fn unparseable_date_fails_the_whole_frame() {
        let df = df!(
            "date" => ["2024-01-01", "not a date"],
            "value" => [1.0, 2.0]
        )
        .unwrap();

        match DataProcessor::normalize_dates(df) {
            Err(LoaderError::InvalidDate { row, value }) => {
                assert_eq!(row, 1);
                assert_eq!(value, "not a date");
            }
            other => panic!("expected invalid date error, got {other:?}"),
        }
    }

    #[test]
    fn frames_without_dates_pass_through() {
        let df = df!("value" => [1.0]).unwrap();
        let df = DataProcessor::normalize_dates(df).unwrap();
        assert_eq!(df.width(), 1);
    }
}
