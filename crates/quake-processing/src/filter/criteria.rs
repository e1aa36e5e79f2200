//! Filter criteria and their builder.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{ProcessingError, Result};
use crate::types::{Hemisphere, MagnitudeCategory, TsunamiFilter};

/// A set of optional row constraints, combined with logical AND.
///
/// Every field defaults to "no constraint", so `FilterCriteria::default()`
/// keeps every row. Criteria can be sent as JSON by a presentation layer;
/// missing fields take their defaults.
///
/// # Example
///
/// ```rust,ignore
/// use quake_processing::filter::FilterCriteria;
/// use quake_processing::types::TsunamiFilter;
///
/// let criteria = FilterCriteria::builder()
///     .year_range(2010, 2015)
///     .tsunami_filter(TsunamiFilter::OnlyWith)
///     .shallow_only(true)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    /// Inclusive `[min, max]` bounds on `year`.
    pub year_range: Option<(i32, i32)>,

    /// Inclusive `[min, max]` bounds on `magnitude`.
    pub magnitude_range: Option<(f64, f64)>,

    /// Upper bound (inclusive) on `depth` in km.
    pub max_depth: Option<f64>,

    pub tsunami_filter: TsunamiFilter,

    /// Hemispheres to keep. Empty, or all four, means no geographic filter.
    pub hemispheres: BTreeSet<Hemisphere>,

    /// Magnitude bins to keep. Empty means no category filter.
    pub magnitude_categories: BTreeSet<MagnitudeCategory>,

    /// Lower bound (inclusive) on `sig`.
    pub min_significance: Option<f64>,

    /// Keep only events shallower than 50 km.
    pub shallow_only: bool,

    /// Keep only events of magnitude 7.0 or more.
    pub high_magnitude_only: bool,
}

impl FilterCriteria {
    /// Create a new criteria builder.
    pub fn builder() -> FilterCriteriaBuilder {
        FilterCriteriaBuilder::default()
    }

    /// Parse criteria from JSON and validate them.
    pub fn from_json(json: &str) -> Result<Self> {
        let criteria: FilterCriteria = serde_json::from_str(json)?;
        criteria.validate()?;
        Ok(criteria)
    }

    /// Reject malformed bounds. Nothing is silently corrected.
    pub fn validate(&self) -> Result<()> {
        if let Some((min, max)) = self.year_range
            && min > max
        {
            return Err(ProcessingError::InvalidCriteria(format!(
                "year_range min {min} is greater than max {max}"
            )));
        }

        if let Some((min, max)) = self.magnitude_range {
            if min.is_nan() || max.is_nan() {
                return Err(ProcessingError::InvalidCriteria(
                    "magnitude_range bounds must be numbers".to_string(),
                ));
            }
            if min > max {
                return Err(ProcessingError::InvalidCriteria(format!(
                    "magnitude_range min {min} is greater than max {max}"
                )));
            }
        }

        if self.max_depth.is_some_and(f64::is_nan) {
            return Err(ProcessingError::InvalidCriteria(
                "max_depth must be a number".to_string(),
            ));
        }

        if self.min_significance.is_some_and(f64::is_nan) {
            return Err(ProcessingError::InvalidCriteria(
                "min_significance must be a number".to_string(),
            ));
        }

        Ok(())
    }

    /// Whether these criteria keep every row.
    pub fn is_empty(&self) -> bool {
        self.year_range.is_none()
            && self.magnitude_range.is_none()
            && self.max_depth.is_none()
            && self.tsunami_filter == TsunamiFilter::All
            && !self.filters_hemispheres()
            && self.magnitude_categories.is_empty()
            && self.min_significance.is_none()
            && !self.shallow_only
            && !self.high_magnitude_only
    }

    /// Hemispheres whose rows are removed.
    pub fn excluded_hemispheres(&self) -> Vec<Hemisphere> {
        if !self.filters_hemispheres() {
            return Vec::new();
        }
        Hemisphere::ALL
            .into_iter()
            .filter(|h| !self.hemispheres.contains(h))
            .collect()
    }

    fn filters_hemispheres(&self) -> bool {
        !self.hemispheres.is_empty() && self.hemispheres.len() < Hemisphere::ALL.len()
    }
}

/// Builder for [`FilterCriteria`] with fluent API.
#[derive(Debug, Default)]
pub struct FilterCriteriaBuilder {
    criteria: FilterCriteria,
}

impl FilterCriteriaBuilder {
    pub fn year_range(mut self, min: i32, max: i32) -> Self {
        self.criteria.year_range = Some((min, max));
        self
    }

    pub fn magnitude_range(mut self, min: f64, max: f64) -> Self {
        self.criteria.magnitude_range = Some((min, max));
        self
    }

    pub fn max_depth(mut self, depth: f64) -> Self {
        self.criteria.max_depth = Some(depth);
        self
    }

    pub fn tsunami_filter(mut self, filter: TsunamiFilter) -> Self {
        self.criteria.tsunami_filter = filter;
        self
    }

    /// Add one hemisphere to the keep-set.
    pub fn hemisphere(mut self, hemisphere: Hemisphere) -> Self {
        self.criteria.hemispheres.insert(hemisphere);
        self
    }

    pub fn hemispheres(mut self, hemispheres: impl IntoIterator<Item = Hemisphere>) -> Self {
        self.criteria.hemispheres = hemispheres.into_iter().collect();
        self
    }

    /// Add one magnitude bin to the keep-set.
    pub fn magnitude_category(mut self, category: MagnitudeCategory) -> Self {
        self.criteria.magnitude_categories.insert(category);
        self
    }

    pub fn magnitude_categories(
        mut self,
        categories: impl IntoIterator<Item = MagnitudeCategory>,
    ) -> Self {
        self.criteria.magnitude_categories = categories.into_iter().collect();
        self
    }

    pub fn min_significance(mut self, threshold: f64) -> Self {
        self.criteria.min_significance = Some(threshold);
        self
    }

    pub fn shallow_only(mut self, enabled: bool) -> Self {
        self.criteria.shallow_only = enabled;
        self
    }

    pub fn high_magnitude_only(mut self, enabled: bool) -> Self {
        self.criteria.high_magnitude_only = enabled;
        self
    }

    /// Build the criteria.
    ///
    /// Returns validated `FilterCriteria` or `InvalidCriteria`.
    pub fn build(self) -> Result<FilterCriteria> {
        self.criteria.validate()?;
        Ok(self.criteria)
    }
}
