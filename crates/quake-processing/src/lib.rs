//! Seismic Event Dataset Library
//!
//! Loads tabular earthquake catalogues with Polars, enriches them with
//! derived attributes, and filters them with composable, validated criteria.
//!
//! # Overview
//!
//! - **Preparation**: Schema validation, type coercion and derived columns
//!   (`date`, depth/magnitude categories, monitoring quality, ...)
//! - **Filtering**: AND-combined criteria with a single boolean mask, stable
//!   row order and before/after summaries
//! - **Caching**: A memoizing loader that prepares each source at most once,
//!   even under concurrent callers
//! - **Analytics**: Yearly/monthly aggregates, correlation matrices and
//!   tsunami group comparisons
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use quake_processing::{FilterCriteria, filter, preparer};
//!
//! let events = preparer::load("earthquake_data_tsunami.csv")?;
//! let summary = preparer::describe(&events)?;
//! println!("{} events over {}", summary.total_events, summary.years_span);
//!
//! let criteria = FilterCriteria::builder()
//!     .year_range(2010, 2015)
//!     .shallow_only(true)
//!     .build()?;
//!
//! let filtered = filter::apply(&events, &criteria)?;
//! let stats = filter::summarize(&events, &filtered)?;
//! println!("kept {:.1}% of events", stats.retained_percentage);
//! ```
//!
//! # Sharing a Loaded Table
//!
//! [`DatasetCache`] hands out `Arc<DataFrame>` so that a loaded table can be
//! filtered from many threads at once:
//!
//! ```rust,ignore
//! use quake_processing::{DatasetCache, LoadOptions};
//! use std::sync::Arc;
//!
//! let cache = Arc::new(DatasetCache::new(LoadOptions::default()));
//! let events = cache.get_or_load("earthquake_data_tsunami.csv")?;
//! ```

pub mod analytics;
pub mod cache;
pub mod columns;
pub mod config;
pub mod error;
pub mod filter;
pub mod preparer;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use analytics::{
    CorrelationMatrix, CorrelationMethod, CorrelationPair, GroupStats, MonthlyStats,
    TsunamiComparison, YearlyStats, compare_by_tsunami, correlation_matrix, monthly_stats,
    yearly_stats,
};
pub use cache::DatasetCache;
pub use columns::{canonical_name, variable_description};
pub use config::{ConfigValidationError, LoadOptions, LoadOptionsBuilder};
pub use error::{ProcessingError, Result as ProcessingResult, ResultExt};
pub use filter::{FilterCriteria, FilterCriteriaBuilder};
pub use preparer::{DatasetPreparer, EnrichmentPlan, describe, load};
pub use types::{
    DatasetSummary, DepthCategory, FilterSummary, Hemisphere, MagnitudeCategory, TsunamiFilter,
};
