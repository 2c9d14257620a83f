//! Dashboard page rendering.
//! Layout:
//! 1. Upload form and the name of the data source in use
//! 2. Total and average
//! 3. Category totals (table + bar chart)
//! 4. Per-category time series (table + line chart)

use std::fmt::Write;

use crate::stats::Summary;

/// Everything the page shows besides the summary itself.
#[derive(Debug, Default)]
pub struct PageContext<'a> {
    pub source: Option<&'a str>,
    pub category_chart: Option<String>,
    pub time_series_chart: Option<String>,
}

const STYLE: &str = "body{font-family:sans-serif;margin:2rem auto;max-width:960px;color:#222}\
table{border-collapse:collapse;margin:0.5rem 0 1.5rem}\
th,td{border:1px solid #ccc;padding:0.25rem 0.75rem;text-align:left}\
td.num{text-align:right}\
.stats{display:flex;gap:2rem}\
.stat{border:1px solid #ddd;border-radius:6px;padding:0.75rem 1.5rem}\
.empty{color:#888;font-style:italic}";

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn format_value(value: f64) -> String {
    format!("{value:.2}")
}

pub fn render_dashboard(summary: &Summary, ctx: &PageContext<'_>) -> String {
    // Writing into a String cannot fail.
    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Data Dashboard</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <h1>Data Dashboard</h1>\n"
    );

    let source = match ctx.source {
        Some(name) => format!("Uploaded file: <code>{}</code>", escape_html(name)),
        None => "Default sample data".to_string(),
    };
    let _ = write!(
        html,
        "<form method=\"post\" action=\"/\" enctype=\"multipart/form-data\">\n\
         <input type=\"file\" name=\"file\" accept=\".csv\">\n\
         <button type=\"submit\">Upload CSV</button>\n</form>\n\
         <p>Source: {source} &middot; <a href=\"/api/data\">JSON</a></p>\n"
    );

    if summary.is_empty() {
        html.push_str("<p class=\"empty\">No data available.</p>\n</body>\n</html>\n");
        return html;
    }

    let _ = write!(
        html,
        "<section class=\"stats\">\n\
         <div class=\"stat\"><h3>Total</h3><p>{}</p></div>\n\
         <div class=\"stat\"><h3>Average</h3><p>{}</p></div>\n</section>\n",
        format_value(summary.total),
        format_value(summary.average)
    );

    html.push_str("<h2>Categories</h2>\n<table>\n<tr><th>Category</th><th>Total</th></tr>\n");
    for (name, total) in summary.ranked_categories() {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td class=\"num\">{}</td></tr>",
            escape_html(name),
            format_value(total)
        );
    }
    html.push_str("</table>\n");
    if let Some(svg) = &ctx.category_chart {
        let _ = writeln!(html, "<figure>{svg}</figure>");
    }

    if !summary.time_series.is_empty() {
        html.push_str("<h2>Time series</h2>\n");
        if let Some(svg) = &ctx.time_series_chart {
            let _ = writeln!(html, "<figure>{svg}</figure>");
        }
        for (category, points) in &summary.time_series {
            let _ = writeln!(
                html,
                "<h3>{}</h3>\n<table>\n<tr><th>Date</th><th>Value</th></tr>",
                escape_html(category)
            );
            for point in points {
                let _ = writeln!(
                    html,
                    "<tr><td>{}</td><td class=\"num\">{}</td></tr>",
                    point.date,
                    format_value(point.value)
                );
            }
            html.push_str("</table>\n");
        }
    }

    html.push_str("</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::TimePoint;
    use chrono::NaiveDate;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html("<b>\"Tom & Jerry's\"</b>"),
            "&lt;b&gt;&quot;Tom &amp; Jerry&#39;s&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn empty_summary_renders_placeholder() {
        let html = render_dashboard(&Summary::empty(), &PageContext::default());
        assert!(html.contains("No data available."));
        assert!(html.contains("Default sample data"));
        assert!(html.contains("enctype=\"multipart/form-data\""));
    }

    #[test]
    fn renders_stats_categories_and_series() {
        let mut summary = Summary::empty();
        summary.total = 18.0;
        summary.average = 6.0;
        summary.categories.insert("<A>".into(), 15.0);
        summary.categories.insert("B".into(), 3.0);
        summary.time_series.insert(
            "B".into(),
            vec![TimePoint {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                value: 3.0,
            }],
        );

        let ctx = PageContext {
            source: Some("sales.csv"),
            category_chart: Some("<svg id=\"bars\"></svg>".into()),
            time_series_chart: None,
        };
        let html = render_dashboard(&summary, &ctx);

        assert!(html.contains("Uploaded file: <code>sales.csv</code>"));
        assert!(html.contains("<p>18.00</p>"));
        assert!(html.contains("<p>6.00</p>"));
        assert!(html.contains("<td>&lt;A&gt;</td><td class=\"num\">15.00</td>"));
        assert!(html.contains("<svg id=\"bars\"></svg>"));
        assert!(html.contains("<td>2024-01-01</td><td class=\"num\">3.00</td>"));
        assert!(!html.contains("No data available."));
    }
}
