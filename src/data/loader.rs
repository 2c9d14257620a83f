//! CSV Data Loader Module
//! Resolves the data source for a request and parses it with Polars.

use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::processor::DataProcessor;
use super::table::Table;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),
    #[error("Unparseable date {value:?} in row {row}")]
    InvalidDate { row: usize, value: String },
}

/// Where a load request reads its rows from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// The bundled sample file.
    Sample(PathBuf),
    /// A file previously saved into the upload directory.
    Uploaded(PathBuf),
}

impl DataSource {
    pub fn path(&self) -> &Path {
        match self {
            DataSource::Sample(path) | DataSource::Uploaded(path) => path,
        }
    }
}

/// Loads tables from the upload directory or the bundled sample file.
#[derive(Debug, Clone)]
pub struct DataLoader {
    upload_dir: PathBuf,
    sample_path: PathBuf,
}

impl DataLoader {
    pub fn new(upload_dir: impl Into<PathBuf>, sample_path: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            sample_path: sample_path.into(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn sample_path(&self) -> &Path {
        &self.sample_path
    }

    /// Load the named upload, or the sample when no name is given.
    ///
    /// Every failure degrades to an empty table. A name that does not resolve
    /// to an existing upload yields an empty table, never the sample.
    pub fn load(&self, source_name: Option<&str>) -> Table {
        match self.try_load(source_name) {
            Ok(table) => table,
            Err(e) => {
                warn!(source = ?source_name, error = %e, "load failed, using empty table");
                Table::empty()
            }
        }
    }

    pub fn try_load(&self, source_name: Option<&str>) -> Result<Table, LoaderError> {
        let source = self.resolve(source_name)?;
        match &source {
            DataSource::Uploaded(path) => info!("Loading uploaded file: {}", path.display()),
            DataSource::Sample(path) => info!("Loading default sample file: {}", path.display()),
        }

        let table = Self::load_csv(source.path())?;
        debug!(
            rows = table.row_count(),
            columns = ?table.column_names(),
            dtypes = ?table.dataframe().dtypes(),
            "loaded table"
        );
        Ok(table)
    }

    /// Decide which file a request reads.
    pub fn resolve(&self, source_name: Option<&str>) -> Result<DataSource, LoaderError> {
        let Some(name) = source_name else {
            return Ok(DataSource::Sample(self.sample_path.clone()));
        };

        if !is_plain_file_name(name) {
            return Err(LoaderError::SourceUnavailable(name.to_string()));
        }

        let path = self.upload_dir.join(name);
        if path.is_file() {
            Ok(DataSource::Uploaded(path))
        } else {
            Err(LoaderError::SourceUnavailable(path.display().to_string()))
        }
    }

    /// Parse a CSV file with a header row and normalize its `date` column.
    ///
    /// Column types are inferred from every row, so a late decimal widens an
    /// integer `value` column instead of failing the parse.
    pub fn load_csv(path: &Path) -> Result<Table, LoaderError> {
        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(None)
            .finish()?
            .collect()?;

        let df = DataProcessor::normalize_dates(df)?;
        Ok(Table::new(df))
    }
}

/// A single path component that cannot climb out of the upload directory.
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && Path::new(name).file_name().is_some_and(|f| f == name)
}
