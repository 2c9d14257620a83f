//! Stats module - Summary aggregation

mod calculator;
mod summary;

pub use calculator::SummaryCalculator;
pub use summary::{Summary, TimePoint};
