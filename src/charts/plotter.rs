//! Chart Plotter Module
//! Renders the summary as static SVG charts for the dashboard page.

use chrono::{Datelike, NaiveDate};
use plotters::coord::ranged1d::SegmentValue;
use plotters::prelude::*;
use thiserror::Error;

use crate::stats::Summary;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Failed to draw chart: {0}")]
    Draw(String),
}

/// Default chart size in pixels.
pub const CHART_SIZE: (u32, u32) = (720, 360);

/// Color palette for categories
pub const PALETTE: [RGBColor; 10] = [
    RGBColor(52, 152, 219),  // Blue
    RGBColor(231, 76, 60),   // Red
    RGBColor(46, 204, 113),  // Green
    RGBColor(155, 89, 182),  // Purple
    RGBColor(243, 156, 18),  // Orange
    RGBColor(26, 188, 156),  // Teal
    RGBColor(233, 30, 99),   // Pink
    RGBColor(0, 188, 212),   // Cyan
    RGBColor(121, 85, 72),   // Brown
    RGBColor(96, 125, 139),  // Blue Grey
];

fn draw_err(e: impl std::fmt::Display) -> ChartError {
    ChartError::Draw(e.to_string())
}

/// Y range that always includes zero and never collapses to a point.
///
/// `None` when a value or the padded span is not finite; such data has no
/// drawable axis.
fn value_range(mut values: impl Iterator<Item = f64>) -> Option<std::ops::Range<f64>> {
    let (lo, hi) = values.try_fold((0.0f64, 0.0f64), |(lo, hi), v| {
        v.is_finite().then(|| (lo.min(v), hi.max(v)))
    })?;
    if (hi - lo).abs() < f64::EPSILON {
        return Some(lo..lo + 1.0);
    }
    let pad = (hi - lo) * 0.1;
    let range = (if lo < 0.0 { lo - pad } else { lo })..(hi + pad);
    (range.start.is_finite() && range.end.is_finite()).then_some(range)
}

/// Creates SVG charts from a [`Summary`].
pub struct ChartPlotter;

impl ChartPlotter {
    /// Get color for the n-th category.
    pub fn category_color(index: usize) -> RGBColor {
        PALETTE[index % PALETTE.len()]
    }

    /// Bar chart of per-category totals, largest first.
    pub fn category_bar_chart(summary: &Summary) -> Result<Option<String>, ChartError> {
        let ranked = summary.ranked_categories();
        if ranked.is_empty() {
            return Ok(None);
        }
        let Some(y_range) = value_range(ranked.iter().map(|(_, v)| *v)) else {
            return Ok(None);
        };
        let labels: Vec<String> = ranked.iter().map(|(name, _)| name.to_string()).collect();

        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
            root.fill(&WHITE).map_err(draw_err)?;

            let mut chart = ChartBuilder::on(&root)
                .caption("Totals by category", ("sans-serif", 18))
                .margin(12)
                .x_label_area_size(36)
                .y_label_area_size(64)
                .build_cartesian_2d((0usize..ranked.len()).into_segmented(), y_range)
                .map_err(draw_err)?;

            let label_of = |seg: &SegmentValue<usize>| match seg {
                SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
                _ => String::new(),
            };
            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(ranked.len())
                .x_label_formatter(&label_of)
                .y_desc("Total")
                .draw()
                .map_err(draw_err)?;

            chart
                .draw_series(
                    Histogram::vertical(&chart)
                        .style_func(|seg, _| {
                            let index = match seg {
                                SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => *i,
                                SegmentValue::Last => 0,
                            };
                            Self::category_color(index).filled()
                        })
                        .margin(10)
                        .data(ranked.iter().enumerate().map(|(i, (_, v))| (i, *v))),
                )
                .map_err(draw_err)?;

            root.present().map_err(draw_err)?;
        }
        Ok(Some(svg))
    }

    /// One line per category over the dates it was observed on.
    pub fn time_series_chart(summary: &Summary) -> Result<Option<String>, ChartError> {
        let Some((first, last)) = summary.date_range() else {
            return Ok(None);
        };
        let (mut x_lo, mut x_hi) = (first.num_days_from_ce(), last.num_days_from_ce());
        if x_lo == x_hi {
            x_lo -= 1;
            x_hi += 1;
        }
        let Some(y_range) = value_range(summary.time_series.values().flatten().map(|p| p.value))
        else {
            return Ok(None);
        };

        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
            root.fill(&WHITE).map_err(draw_err)?;

            let mut chart = ChartBuilder::on(&root)
                .caption("Daily totals by category", ("sans-serif", 18))
                .margin(12)
                .x_label_area_size(36)
                .y_label_area_size(64)
                .build_cartesian_2d(x_lo..x_hi, y_range)
                .map_err(draw_err)?;

            let date_label = |day: &i32| {
                NaiveDate::from_num_days_from_ce_opt(*day)
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default()
            };
            chart
                .configure_mesh()
                .x_labels(6)
                .x_label_formatter(&date_label)
                .y_desc("Value")
                .draw()
                .map_err(draw_err)?;

            for (index, (category, points)) in summary.time_series.iter().enumerate() {
                let color = Self::category_color(index);
                let coords: Vec<(i32, f64)> = points
                    .iter()
                    .map(|p| (p.date.num_days_from_ce(), p.value))
                    .collect();

                chart
                    .draw_series(LineSeries::new(coords.clone(), color.stroke_width(2)))
                    .map_err(draw_err)?
                    .label(category.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], color));
                chart
                    .draw_series(
                        coords
                            .into_iter()
                            .map(|c| Circle::new(c, 3, color.filled())),
                    )
                    .map_err(draw_err)?;
            }

            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperLeft)
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
                .map_err(draw_err)?;

            root.present().map_err(draw_err)?;
        }
        Ok(Some(svg))
    }
}
