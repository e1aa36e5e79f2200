//! Exploratory aggregates over an enriched (optionally filtered) table.
//!
//! All functions are read-only and work on any table that carries the
//! columns they need.

mod compare;
mod correlation;
mod temporal;

pub use compare::{GroupStats, TsunamiComparison, compare_by_tsunami};
pub use correlation::{
    CorrelationMatrix, CorrelationMethod, CorrelationPair, correlation_matrix,
    default_correlation_columns,
};
pub use temporal::{MonthlyStats, YearlyStats, month_name, monthly_stats, yearly_stats};
