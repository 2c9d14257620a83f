//! Data module - CSV loading and normalization

mod loader;
mod processor;
mod table;

pub use loader::DataLoader;
pub use processor::DataProcessor;
pub use table::{Table, CATEGORY_COLUMN, DATE_COLUMN, VALUE_COLUMN};
