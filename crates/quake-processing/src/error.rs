//! Custom error types for the seismic dataset pipeline.
//!
//! Load-time failures (`NotFound`, `Parse`, `Schema`) are fatal to that load
//! attempt and never come with a partially enriched table. Filter failures
//! (`InvalidCriteria`) are raised before any row is scanned.
//!
//! Errors are serializable so a presentation layer can receive them as
//! `{ "code": ..., "message": ... }` objects.

use std::path::PathBuf;

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

use crate::config::ConfigValidationError;

/// The main error type for loading, deriving and filtering event tables.
#[derive(Error, Debug)]
pub enum ProcessingError {
    /// The data source does not exist.
    #[error("Data source not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The source exists but is not valid tabular content.
    #[error("Failed to parse dataset: {0}")]
    Parse(String),

    /// One or more required columns are missing from the header row.
    #[error("Missing required columns: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    /// Filter criteria are malformed (e.g. a range with min > max).
    #[error("Invalid filter criteria: {0}")]
    InvalidCriteria(String),

    /// A column needed by an operation is not present in the table.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Load options failed validation.
    #[error("Invalid load options: {0}")]
    Config(#[from] ConfigValidationError),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ProcessingError>,
    },
}

impl ProcessingError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ProcessingError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Build a schema error from the list of missing column names.
    pub fn missing_columns<I, S>(missing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ProcessingError::Schema {
            missing: missing.into_iter().map(Into::into).collect(),
        }
    }

    /// Get error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Parse(_) => "PARSE_ERROR",
            Self::Schema { .. } => "SCHEMA_ERROR",
            Self::InvalidCriteria(_) => "INVALID_CRITERIA",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error happened while loading a dataset.
    pub fn is_load_failure(&self) -> bool {
        match self {
            Self::NotFound(_) | Self::Parse(_) | Self::Schema { .. } => true,
            Self::WithContext { source, .. } => source.is_load_failure(),
            _ => false,
        }
    }

    /// Check if the caller can recover by changing its input
    /// (new criteria) without reloading the dataset.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::InvalidCriteria(_) | Self::Config(_) => true,
            Self::WithContext { source, .. } => source.is_recoverable(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for ProcessingError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ProcessingError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for processing operations.
pub type Result<T> = std::result::Result<T, ProcessingError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ProcessingError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            ProcessingError::NotFound(PathBuf::from("quakes.csv")).error_code(),
            "NOT_FOUND"
        );
        assert_eq!(
            ProcessingError::missing_columns(["depth"]).error_code(),
            "SCHEMA_ERROR"
        );
        assert_eq!(
            ProcessingError::InvalidCriteria("bad".to_string()).error_code(),
            "INVALID_CRITERIA"
        );
    }

    #[test]
    fn test_schema_error_names_columns() {
        let error = ProcessingError::missing_columns(["depth", "sig"]);
        let message = error.to_string();
        assert!(message.contains("depth"));
        assert!(message.contains("sig"));
    }

    #[test]
    fn test_load_failure_classification() {
        assert!(ProcessingError::Parse("x".to_string()).is_load_failure());
        assert!(ProcessingError::missing_columns(["year"]).is_load_failure());
        assert!(!ProcessingError::InvalidCriteria("x".to_string()).is_load_failure());
    }

    #[test]
    fn test_is_recoverable() {
        assert!(ProcessingError::InvalidCriteria("min > max".to_string()).is_recoverable());
        assert!(!ProcessingError::Parse("broken".to_string()).is_recoverable());
    }

    #[test]
    fn test_error_serialization() {
        let error = ProcessingError::ColumnNotFound("magnitude".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("COLUMN_NOT_FOUND"));
        assert!(json.contains("magnitude"));
    }

    #[test]
    fn test_with_context() {
        let error = ProcessingError::missing_columns(["depth"]).with_context("Loading quakes.csv");
        assert!(error.to_string().contains("Loading quakes.csv"));
        assert_eq!(error.error_code(), "SCHEMA_ERROR");
        assert!(error.is_load_failure());
    }
}
