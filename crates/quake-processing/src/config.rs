//! Configuration for reading seismic datasets from delimited text files.
//!
//! Use [`LoadOptions::builder()`] for a validated configuration.

use serde::{Deserialize, Serialize};

/// Default number of rows polars scans to infer column types.
pub const DEFAULT_INFER_SCHEMA_LENGTH: usize = 100;

/// Options controlling how a raw dataset is read from storage.
///
/// # Example
///
/// ```rust,ignore
/// use quake_processing::config::LoadOptions;
///
/// let options = LoadOptions::builder()
///     .delimiter(b';')
///     .infer_schema_length(500)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Column separator.
    /// Default: `,`
    pub delimiter: u8,

    /// Quote character, or `None` to disable quote handling.
    /// Default: `"`
    pub quote_char: Option<u8>,

    /// Rows scanned for type inference.
    /// Default: 100
    pub infer_schema_length: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote_char: Some(b'"'),
            infer_schema_length: DEFAULT_INFER_SCHEMA_LENGTH,
        }
    }
}

impl LoadOptions {
    /// Create a new options builder.
    pub fn builder() -> LoadOptionsBuilder {
        LoadOptionsBuilder::default()
    }

    /// Validate the options and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !self.delimiter.is_ascii() || matches!(self.delimiter, b'\n' | b'\r') {
            return Err(ConfigValidationError::InvalidDelimiter(
                self.delimiter as char,
            ));
        }

        if self.quote_char == Some(self.delimiter) {
            return Err(ConfigValidationError::DelimiterIsQuote(
                self.delimiter as char,
            ));
        }

        if self.infer_schema_length == 0 {
            return Err(ConfigValidationError::InvalidInferSchemaLength(
                self.infer_schema_length,
            ));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid delimiter {0:?} (must be a single ASCII character other than a line break)")]
    InvalidDelimiter(char),

    #[error("Delimiter {0:?} cannot also be the quote character")]
    DelimiterIsQuote(char),

    #[error("Invalid schema inference length: {0} (must be at least 1)")]
    InvalidInferSchemaLength(usize),
}

/// Builder for [`LoadOptions`] with fluent API.
#[derive(Debug, Default)]
pub struct LoadOptionsBuilder {
    delimiter: Option<u8>,
    quote_char: Option<Option<u8>>,
    infer_schema_length: Option<usize>,
}

impl LoadOptionsBuilder {
    /// Set the column separator.
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Set the quote character (`None` disables quoting).
    pub fn quote_char(mut self, quote_char: Option<u8>) -> Self {
        self.quote_char = Some(quote_char);
        self
    }

    /// Set how many rows are scanned to infer column types.
    pub fn infer_schema_length(mut self, rows: usize) -> Self {
        self.infer_schema_length = Some(rows);
        self
    }

    /// Build the options.
    ///
    /// Returns validated `LoadOptions` or an error if validation fails.
    pub fn build(self) -> Result<LoadOptions, ConfigValidationError> {
        let defaults = LoadOptions::default();
        let options = LoadOptions {
            delimiter: self.delimiter.unwrap_or(defaults.delimiter),
            quote_char: self.quote_char.unwrap_or(defaults.quote_char),
            infer_schema_length: self
                .infer_schema_length
                .unwrap_or(defaults.infer_schema_length),
        };

        options.validate()?;
        Ok(options)
    }
}
