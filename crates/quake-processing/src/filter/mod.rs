//! Filter engine.
//!
//! Applies [`FilterCriteria`] to an enriched table. Each active option
//! contributes a boolean mask; the masks are AND-ed and applied with a
//! single `DataFrame::filter`, so row order is preserved and the result is
//! independent of the order in which options are evaluated.

mod criteria;

pub use criteria::{FilterCriteria, FilterCriteriaBuilder};

use polars::prelude::*;
use tracing::debug;

use crate::columns::{
    DEPTH, LATITUDE, LONGITUDE, MAGNITUDE, MAGNITUDE_CATEGORY, SIGNIFICANCE, TSUNAMI, YEAR,
};
use crate::error::Result;
use crate::preparer::count_tsunami_events;
use crate::preparer::derive::{HIGH_MAGNITUDE_THRESHOLD, SHALLOW_DEPTH_KM};
use crate::types::{FilterSummary, MagnitudeCategory, TsunamiFilter, percentage};
use crate::utils::{f64_values, has_column, i32_values, str_values};

/// Return the rows of `df` that satisfy every active option of `criteria`.
///
/// Criteria are validated before any row is scanned. The input table is
/// never modified. A row whose value for a constrained column is missing
/// does not satisfy that constraint.
pub fn apply(df: &DataFrame, criteria: &FilterCriteria) -> Result<DataFrame> {
    criteria.validate()?;

    if criteria.is_empty() {
        return Ok(df.clone());
    }

    let mut keep = vec![true; df.height()];

    if let Some((min, max)) = criteria.year_range {
        let years = i32_values(df, YEAR)?;
        retain(&mut keep, &years, |y| (min..=max).contains(&y));
    }

    if let Some((min, max)) = criteria.magnitude_range {
        let magnitude = f64_values(df, MAGNITUDE)?;
        retain(&mut keep, &magnitude, |m| m >= min && m <= max);
    }

    if let Some(max_depth) = criteria.max_depth {
        let depth = f64_values(df, DEPTH)?;
        retain(&mut keep, &depth, |d| d <= max_depth);
    }

    match criteria.tsunami_filter {
        TsunamiFilter::All => {}
        TsunamiFilter::OnlyWith => retain(&mut keep, &i32_values(df, TSUNAMI)?, |t| t == 1),
        TsunamiFilter::OnlyWithout => retain(&mut keep, &i32_values(df, TSUNAMI)?, |t| t == 0),
    }

    let excluded = criteria.excluded_hemispheres();
    if !excluded.is_empty() {
        let latitude = f64_values(df, LATITUDE)?;
        let longitude = f64_values(df, LONGITUDE)?;
        for (row, flag) in keep.iter_mut().enumerate() {
            let (lat, lon) = (latitude[row], longitude[row]);
            if excluded.iter().any(|h| h.contains(lat, lon)) {
                *flag = false;
            }
        }
    }

    if !criteria.magnitude_categories.is_empty() {
        let categories = magnitude_categories(df)?;
        retain(&mut keep, &categories, |c| {
            criteria.magnitude_categories.contains(&c)
        });
    }

    if let Some(threshold) = criteria.min_significance {
        let significance = f64_values(df, SIGNIFICANCE)?;
        retain(&mut keep, &significance, |s| s >= threshold);
    }

    if criteria.shallow_only {
        let depth = f64_values(df, DEPTH)?;
        retain(&mut keep, &depth, |d| d < SHALLOW_DEPTH_KM);
    }

    if criteria.high_magnitude_only {
        let magnitude = f64_values(df, MAGNITUDE)?;
        retain(&mut keep, &magnitude, |m| m >= HIGH_MAGNITUDE_THRESHOLD);
    }

    let mask = BooleanChunked::from_slice("mask".into(), &keep);
    let filtered = df.filter(&mask)?;
    debug!("Filter kept {} of {} rows", filtered.height(), df.height());
    Ok(filtered)
}

/// Before/after statistics for a filter application.
pub fn summarize(original: &DataFrame, filtered: &DataFrame) -> Result<FilterSummary> {
    let original_count = original.height();
    let filtered_count = filtered.height();
    let tsunami_count = count_tsunami_events(filtered)?;

    Ok(FilterSummary {
        original_count,
        filtered_count,
        retained_percentage: percentage(filtered_count, original_count),
        removed_count: original_count.saturating_sub(filtered_count),
        tsunami_count,
        tsunami_percentage: percentage(tsunami_count, filtered_count),
    })
}

/// Clear `keep` for rows whose value is missing or fails `predicate`.
fn retain<T: Copy>(keep: &mut [bool], values: &[Option<T>], predicate: impl Fn(T) -> bool) {
    for (flag, value) in keep.iter_mut().zip(values) {
        if *flag && !value.is_some_and(&predicate) {
            *flag = false;
        }
    }
}

/// Magnitude bin per row, read from the derived column when present.
fn magnitude_categories(df: &DataFrame) -> Result<Vec<Option<MagnitudeCategory>>> {
    if has_column(df, MAGNITUDE_CATEGORY) {
        return Ok(str_values(df, MAGNITUDE_CATEGORY)?
            .into_iter()
            .map(|label| label.as_deref().and_then(MagnitudeCategory::from_label))
            .collect());
    }
    Ok(f64_values(df, MAGNITUDE)?
        .into_iter()
        .map(|m| m.and_then(MagnitudeCategory::from_magnitude))
        .collect())
}
