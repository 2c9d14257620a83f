//! Charts module - SVG chart rendering

mod plotter;

pub use plotter::{ChartError, ChartPlotter};
