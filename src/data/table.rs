//! In-memory table of parsed CSV rows.
//! Thin wrapper over a Polars DataFrame with typed views of the known columns.

use chrono::{Datelike, NaiveDate};
use polars::prelude::*;

pub const VALUE_COLUMN: &str = "value";
pub const CATEGORY_COLUMN: &str = "category";
pub const DATE_COLUMN: &str = "date";

/// Days between 0001-01-01 (CE day 1) and the Unix epoch.
const UNIX_EPOCH_FROM_CE: i32 = 719_163;

/// Parsed tabular data. Built fresh per request and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Table {
    df: DataFrame,
}

impl Default for Table {
    fn default() -> Self {
        Self::empty()
    }
}

impl Table {
    pub fn new(df: DataFrame) -> Self {
        Self { df }
    }

    /// A table with no columns and no rows.
    pub fn empty() -> Self {
        Self {
            df: DataFrame::empty(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.df.column(name).is_ok()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// `value` column as floats. Fails if the column is absent or not numeric.
    pub fn values(&self) -> PolarsResult<Vec<Option<f64>>> {
        let column = self.df.column(VALUE_COLUMN)?;
        if !is_numeric(column.dtype()) {
            return Err(PolarsError::SchemaMismatch(
                format!("column '{VALUE_COLUMN}' has non-numeric type {}", column.dtype()).into(),
            ));
        }
        let as_f64 = column.cast(&DataType::Float64)?;
        Ok(as_f64.f64()?.into_iter().collect())
    }

    /// `category` column rendered as strings.
    pub fn categories(&self) -> PolarsResult<Vec<Option<String>>> {
        let column = self.df.column(CATEGORY_COLUMN)?.cast(&DataType::String)?;
        Ok(column
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect())
    }

    /// `date` column as calendar dates, `None` if the table has no such column.
    pub fn dates(&self) -> PolarsResult<Option<Vec<Option<NaiveDate>>>> {
        let Ok(column) = self.df.column(DATE_COLUMN) else {
            return Ok(None);
        };
        let days = column.cast(&DataType::Int32)?;
        let dates = days
            .i32()?
            .into_iter()
            .map(|d| d.and_then(days_to_date))
            .collect();
        Ok(Some(dates))
    }
}

/// Convert a date to days since the Unix epoch (the physical Polars `Date` layout).
pub fn date_to_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_FROM_CE
}

fn days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_FROM_CE)
}

fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_table_has_no_rows_or_columns() {
        let table = Table::empty();
        assert!(table.is_empty());
        assert_eq!(table.row_count(), 0);
        assert!(table.column_names().is_empty());
        assert!(!table.has_column(VALUE_COLUMN));
    }

    #[test]
    fn epoch_day_conversion_matches_polars_layout() {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        assert_eq!(date_to_days(epoch), 0);
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(days_to_date(date_to_days(day)), Some(day));
    }

    #[test]
    fn integer_values_are_coerced_to_floats() {
        let df = df!(
            "category" => ["A", "B"],
            "value" => [10i64, 3]
        )
        .unwrap();
        let table = Table::new(df);
        assert_eq!(table.values().unwrap(), vec![Some(10.0), Some(3.0)]);
        assert_eq!(
            table.categories().unwrap(),
            vec![Some("A".to_string()), Some("B".to_string())]
        );
        assert!(table.dates().unwrap().is_none());
    }

    #[test]
    fn text_values_are_rejected() {
        let df = df!(
            "category" => ["A"],
            "value" => ["ten"]
        )
        .unwrap();
        assert!(Table::new(df).values().is_err());
    }
}
