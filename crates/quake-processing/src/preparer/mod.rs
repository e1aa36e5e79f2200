//! Dataset preparation.
//!
//! Reads a raw event table, validates its schema, coerces column types and
//! appends the derived attributes. The result is sorted by `date`, newest
//! first, with ties kept in file order.

pub mod derive;
mod schema;
mod summary;

pub use derive::{EnrichmentPlan, derive_columns};
pub use summary::describe;
pub(crate) use summary::count_tsunami_events;

use polars::io::csv::read::{CsvParseOptions, CsvReadOptions};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::columns::DATE;
use crate::config::LoadOptions;
use crate::error::{ProcessingError, Result};

/// Loads and enriches seismic event tables.
#[derive(Debug, Clone, Default)]
pub struct DatasetPreparer {
    options: LoadOptions,
}

impl DatasetPreparer {
    pub fn new(options: LoadOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Read a delimited file and return the enriched table.
    ///
    /// Fails with `NotFound` when the path does not exist, `Parse` when the
    /// content is not valid tabular data, and `Schema` when required columns
    /// are missing. No partially enriched table is ever returned.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        self.options.validate()?;

        if !path.exists() {
            return Err(ProcessingError::NotFound(path.to_path_buf()));
        }

        info!("Loading dataset from {}", path.display());
        let raw = self.read_csv(path)?;
        debug!("Read {} rows x {} columns", raw.height(), raw.width());

        self.prepare(raw)
    }

    /// Enrich an already-read table.
    pub fn prepare(&self, mut df: DataFrame) -> Result<DataFrame> {
        schema::normalize_headers(&mut df)?;
        schema::validate_required(&df)?;
        schema::coerce_types(&mut df)?;

        let plan = EnrichmentPlan::from_frame(&df);
        debug!("Enrichment plan: {:?}", plan);

        for series in derive_columns(&df, &plan)? {
            df.with_column(series)?;
        }

        let df = df.sort(
            [DATE],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true),
        )?;

        info!("Prepared dataset: {} events, {} columns", df.height(), df.width());
        Ok(df)
    }

    fn read_csv(&self, path: &Path) -> Result<DataFrame> {
        let overrides = schema::float_overrides(&self.read_headers(path)?);
        debug!("Forcing Float64 for {} columns", overrides.len());

        self.csv_options()
            .with_infer_schema_length(Some(self.options.infer_schema_length))
            .with_schema_overwrite(Some(Arc::new(overrides)))
            .try_into_reader_with_file_path(Some(PathBuf::from(path)))
            .and_then(|reader| reader.finish())
            .map_err(|e| parse_error(path, e))
    }

    /// Header row only; every column is read as text.
    fn read_headers(&self, path: &Path) -> Result<Vec<String>> {
        let header = self
            .csv_options()
            .with_n_rows(Some(0))
            .with_infer_schema_length(Some(0))
            .try_into_reader_with_file_path(Some(PathBuf::from(path)))
            .and_then(|reader| reader.finish())
            .map_err(|e| parse_error(path, e))?;

        Ok(header
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect())
    }

    fn csv_options(&self) -> CsvReadOptions {
        let parse_options = CsvParseOptions::default()
            .with_separator(self.options.delimiter)
            .with_quote_char(self.options.quote_char);

        CsvReadOptions::default()
            .with_has_header(true)
            .with_parse_options(parse_options)
    }
}

fn parse_error(path: &Path, err: PolarsError) -> ProcessingError {
    ProcessingError::Parse(format!("{}: {}", path.display(), err))
}

/// Load a dataset with default options.
pub fn load(path: impl AsRef<Path>) -> Result<DataFrame> {
    DatasetPreparer::default().load(path)
}
