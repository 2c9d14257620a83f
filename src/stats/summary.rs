//! Summary record produced by the aggregator and serialized for the page and API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One observation of a category's time series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Fixed-shape aggregate of a table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total: f64,
    pub average: f64,
    pub categories: BTreeMap<String, f64>,
    pub time_series: BTreeMap<String, Vec<TimePoint>>,
}

impl Summary {
    /// total = 0.0, average = 0.0, no categories, no time series.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.time_series.is_empty() && self.total == 0.0
    }

    /// Categories ordered by total, largest first.
    pub fn ranked_categories(&self) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self
            .categories
            .iter()
            .map(|(name, total)| (name.as_str(), *total))
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked
    }

    /// Earliest and latest date across every series.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.time_series.values().flatten().map(|p| p.date);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_summary_serializes_to_zeroed_record() {
        let json = serde_json::to_value(Summary::empty()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "total": 0.0,
                "average": 0.0,
                "categories": {},
                "time_series": {}
            })
        );
    }

    #[test]
    fn time_points_use_iso_dates() {
        let point = TimePoint {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            value: 5.0,
        };
        let json = serde_json::to_value(point).unwrap();
        assert_eq!(json, serde_json::json!({"date": "2024-01-02", "value": 5.0}));
    }

    #[test]
    fn ranked_categories_sort_descending() {
        let mut summary = Summary::empty();
        summary.categories.insert("A".into(), 2.0);
        summary.categories.insert("B".into(), 7.5);
        summary.categories.insert("C".into(), 4.0);

        assert_eq!(
            summary.ranked_categories(),
            vec![("B", 7.5), ("C", 4.0), ("A", 2.0)]
        );
    }
}
