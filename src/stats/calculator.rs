//! Statistics Calculator Module
//! Reduces a table to totals, a mean, per-category totals and per-category time series.

use chrono::NaiveDate;
use polars::prelude::PolarsError;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tracing::{debug, warn};

use super::summary::{Summary, TimePoint};
use crate::data::{Table, CATEGORY_COLUMN, DATE_COLUMN, VALUE_COLUMN};

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("Missing column: {0}")]
    MissingColumn(&'static str),
    #[error("Column '{column}' is malformed: {source}")]
    InvalidColumn {
        column: &'static str,
        #[source]
        source: PolarsError,
    },
    #[error("Column lengths differ: {values} values, {categories} categories")]
    LengthMismatch { values: usize, categories: usize },
    #[error("Result for {0} is not a finite number")]
    NonFinite(String),
}

/// A row with a usable value.
struct Observation<'a> {
    value: f64,
    category: Option<&'a str>,
    date: Option<NaiveDate>,
}

/// Computes the [`Summary`] of a [`Table`].
pub struct SummaryCalculator;

impl SummaryCalculator {
    /// Aggregate a table, degrading any failure to [`Summary::empty`].
    pub fn aggregate(table: &Table) -> Summary {
        match Self::try_aggregate(table) {
            Ok(summary) => summary,
            Err(e) => {
                warn!(error = %e, "aggregation failed, using empty summary");
                Summary::empty()
            }
        }
    }

    pub fn try_aggregate(table: &Table) -> Result<Summary, AggregateError> {
        if table.is_empty() {
            return Ok(Summary::empty());
        }

        let values = Self::required(table, VALUE_COLUMN, Table::values)?;
        let categories = Self::required(table, CATEGORY_COLUMN, Table::categories)?;
        if values.len() != categories.len() {
            return Err(AggregateError::LengthMismatch {
                values: values.len(),
                categories: categories.len(),
            });
        }
        let dates = table
            .dates()
            .map_err(|source| AggregateError::InvalidColumn {
                column: DATE_COLUMN,
                source,
            })?;

        let observations: Vec<Observation<'_>> = values
            .iter()
            .zip(&categories)
            .enumerate()
            .filter_map(|(i, (value, category))| {
                let value = (*value).filter(|v| !v.is_nan())?;
                Some(Observation {
                    value,
                    category: category.as_deref(),
                    date: dates.as_ref().and_then(|d| d.get(i).copied().flatten()),
                })
            })
            .collect();

        if observations.is_empty() {
            return Ok(Summary::empty());
        }

        let total: f64 = observations.iter().map(|o| o.value).sum();
        let average = total / observations.len() as f64;
        let categories = Self::category_totals(&observations);
        let time_series = if dates.is_some() {
            Self::time_series(&observations)
        } else {
            BTreeMap::new()
        };
        Self::ensure_finite(total, average, &categories, &time_series)?;

        debug!(
            rows = observations.len(),
            total,
            average,
            categories = categories.len(),
            "computed summary"
        );

        Ok(Summary {
            total,
            average,
            categories,
            time_series,
        })
    }

    fn required<T>(
        table: &Table,
        column: &'static str,
        read: impl Fn(&Table) -> Result<T, PolarsError>,
    ) -> Result<T, AggregateError> {
        if !table.has_column(column) {
            return Err(AggregateError::MissingColumn(column));
        }
        read(table).map_err(|source| AggregateError::InvalidColumn { column, source })
    }

    /// Infinite inputs and overflowing sums have no JSON representation.
    fn ensure_finite(
        total: f64,
        average: f64,
        categories: &BTreeMap<String, f64>,
        time_series: &BTreeMap<String, Vec<TimePoint>>,
    ) -> Result<(), AggregateError> {
        if !total.is_finite() {
            return Err(AggregateError::NonFinite("total".into()));
        }
        if !average.is_finite() {
            return Err(AggregateError::NonFinite("average".into()));
        }
        if let Some(name) = categories
            .iter()
            .find_map(|(name, v)| (!v.is_finite()).then_some(name))
        {
            return Err(AggregateError::NonFinite(format!("category '{name}'")));
        }
        if let Some((name, point)) = time_series
            .iter()
            .find_map(|(name, points)| points.iter().find(|p| !p.value.is_finite()).map(|p| (name, p)))
        {
            return Err(AggregateError::NonFinite(format!(
                "series '{name}' on {}",
                point.date
            )));
        }
        Ok(())
    }

    /// Sum of `value` per category.
    fn category_totals(observations: &[Observation<'_>]) -> BTreeMap<String, f64> {
        let mut totals: BTreeMap<String, f64> = BTreeMap::new();
        for obs in observations {
            if let Some(category) = obs.category {
                *totals.entry(category.to_string()).or_insert(0.0) += obs.value;
            }
        }
        totals
    }

    /// Sum per (date, category), then one date-ordered series per category.
    ///
    /// Dates a category never observed get no entry.
    fn time_series(observations: &[Observation<'_>]) -> BTreeMap<String, Vec<TimePoint>> {
        let mut cells: HashMap<(NaiveDate, &str), f64> = HashMap::new();
        for obs in observations {
            if let (Some(date), Some(category)) = (obs.date, obs.category) {
                *cells.entry((date, category)).or_insert(0.0) += obs.value;
            }
        }

        let mut series: BTreeMap<String, Vec<TimePoint>> = BTreeMap::new();
        for ((date, category), value) in cells {
            series
                .entry(category.to_string())
                .or_default()
                .push(TimePoint { date, value });
        }
        for points in series.values_mut() {
            points.sort_by_key(|p| p.date);
        }
        series
    }
}
