//! Derived attribute computation.
//!
//! Each derivation reads the raw columns it needs and returns one new
//! series. [`derive_columns`] runs them in the fixed order of
//! [`DERIVED_COLUMNS`](crate::columns::DERIVED_COLUMNS). Whole-column
//! statistics (the min/max used by `monitoring_quality`) are computed once
//! over the full loaded table, never per row.

use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;

use crate::columns::{
    AZIMUTHAL_GAP, COMMUNITY_INTENSITY, DATE, DEPTH, DEPTH_CATEGORY, HIGH_MAGNITUDE, IMPACT_LEVEL,
    IS_SHALLOW, MAGNITUDE, MAGNITUDE_CATEGORY, MIN_DISTANCE, MONITORING_QUALITY, MONTH,
    OCEANIC_EVENT, STATION_COUNT, TSUNAMI, TSUNAMI_LABEL, YEAR,
};
use crate::error::{ProcessingError, Result};
use crate::types::{DepthCategory, MagnitudeCategory};
use crate::utils::{f64_values, has_column, i32_values, min_max};

/// Events shallower than this (km) are flagged `is_shallow`.
pub const SHALLOW_DEPTH_KM: f64 = 50.0;
/// Events at or above this magnitude are flagged `high_magnitude`.
pub const HIGH_MAGNITUDE_THRESHOLD: f64 = 7.0;
/// Events whose nearest station is farther than this (degrees) are oceanic.
pub const OCEANIC_DMIN_DEGREES: f64 = 5.0;
/// Monitoring quality used when station metadata is unavailable.
pub const NEUTRAL_MONITORING_QUALITY: f64 = 0.5;

const STATION_WEIGHT: f64 = 0.4;
const GAP_WEIGHT: f64 = 0.3;
const DISTANCE_WEIGHT: f64 = 0.3;

pub const WITH_TSUNAMI: &str = "With Tsunami";
pub const WITHOUT_TSUNAMI: &str = "Without Tsunami";

/// Which optional derivations have real inputs, decided once per load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EnrichmentPlan {
    /// `dmin` is present, so `oceanic_event` is computed.
    pub has_min_distance: bool,
    /// `nst`, `gap` and `dmin` are all present, so `monitoring_quality`
    /// is computed instead of the neutral constant.
    pub has_monitoring_columns: bool,
    /// `cdi` is present, so `impact_level` is computed.
    pub has_intensity: bool,
}

impl EnrichmentPlan {
    pub fn from_frame(df: &DataFrame) -> Self {
        let has_min_distance = has_column(df, MIN_DISTANCE);
        Self {
            has_min_distance,
            has_monitoring_columns: has_min_distance
                && has_column(df, STATION_COUNT)
                && has_column(df, AZIMUTHAL_GAP),
            has_intensity: has_column(df, COMMUNITY_INTENSITY),
        }
    }
}

/// Compute every derived column, in order.
pub fn derive_columns(df: &DataFrame, plan: &EnrichmentPlan) -> Result<Vec<Series>> {
    let magnitude = f64_values(df, MAGNITUDE)?;
    let depth = f64_values(df, DEPTH)?;
    let rows = df.height();

    Ok(vec![
        date_column(df)?,
        flag_column(IS_SHALLOW, &depth, |d| d < SHALLOW_DEPTH_KM),
        flag_column(HIGH_MAGNITUDE, &magnitude, |m| m >= HIGH_MAGNITUDE_THRESHOLD),
        oceanic_column(df, plan, rows)?,
        tsunami_label_column(df)?,
        category_column(MAGNITUDE_CATEGORY, &magnitude, |m| {
            MagnitudeCategory::from_magnitude(m).map(MagnitudeCategory::label)
        }),
        category_column(DEPTH_CATEGORY, &depth, |d| {
            DepthCategory::from_depth(d).map(DepthCategory::label)
        }),
        monitoring_quality_column(df, plan, rows)?,
        impact_level_column(df, plan, rows)?,
    ])
}

/// First day of the event month, as a polars `Date`.
fn date_column(df: &DataFrame) -> Result<Series> {
    let years = i32_values(df, YEAR)?;
    let months = i32_values(df, MONTH)?;
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)
        .ok_or_else(|| ProcessingError::Parse("invalid epoch".to_string()))?;

    let days = years
        .iter()
        .zip(&months)
        .enumerate()
        .map(|(row, (year, month))| {
            let date = match (year, month) {
                (Some(y), Some(m)) if (1..=12).contains(m) => {
                    NaiveDate::from_ymd_opt(*y, *m as u32, 1)
                }
                _ => None,
            };
            date.map(|d| d.signed_duration_since(epoch).num_days() as i32)
                .ok_or_else(|| {
                    ProcessingError::Parse(format!(
                        "row {row}: invalid year/month ({year:?}, {month:?})"
                    ))
                })
        })
        .collect::<Result<Vec<i32>>>()?;

    Ok(Series::new(DATE.into(), days).cast(&DataType::Date)?)
}

/// 0/1 flag; missing inputs yield 0.
fn flag_column(name: &str, values: &[Option<f64>], predicate: impl Fn(f64) -> bool) -> Series {
    let flags: Vec<i32> = values
        .iter()
        .map(|v| v.is_some_and(&predicate) as i32)
        .collect();
    Series::new(name.into(), flags)
}

fn oceanic_column(df: &DataFrame, plan: &EnrichmentPlan, rows: usize) -> Result<Series> {
    if !plan.has_min_distance {
        return Ok(Series::new(OCEANIC_EVENT.into(), vec![0i32; rows]));
    }
    let dmin = f64_values(df, MIN_DISTANCE)?;
    Ok(flag_column(OCEANIC_EVENT, &dmin, |d| d > OCEANIC_DMIN_DEGREES))
}

fn tsunami_label_column(df: &DataFrame) -> Result<Series> {
    let labels: Vec<Option<&str>> = i32_values(df, TSUNAMI)?
        .into_iter()
        .map(|flag| match flag {
            Some(1) => Some(WITH_TSUNAMI),
            Some(0) => Some(WITHOUT_TSUNAMI),
            _ => None,
        })
        .collect();
    Ok(Series::new(TSUNAMI_LABEL.into(), labels))
}

fn category_column(
    name: &str,
    values: &[Option<f64>],
    bin: impl Fn(f64) -> Option<&'static str>,
) -> Series {
    let labels: Vec<Option<&str>> = values.iter().map(|v| v.and_then(&bin)).collect();
    Series::new(name.into(), labels)
}

/// Min-max normalisation over the whole column. A constant column
/// normalises to 0 instead of dividing by zero.
pub(crate) fn normalize(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let Some((min, max)) = min_max(values) else {
        return vec![None; values.len()];
    };
    let span = max - min;

    values
        .iter()
        .map(|v| {
            v.filter(|x| !x.is_nan())
                .map(|x| if span == 0.0 { 0.0 } else { (x - min) / span })
        })
        .collect()
}

fn monitoring_quality_column(
    df: &DataFrame,
    plan: &EnrichmentPlan,
    rows: usize,
) -> Result<Series> {
    if !plan.has_monitoring_columns {
        return Ok(Series::new(
            MONITORING_QUALITY.into(),
            vec![NEUTRAL_MONITORING_QUALITY; rows],
        ));
    }

    let stations = normalize(&f64_values(df, STATION_COUNT)?);
    let gap = normalize(&f64_values(df, AZIMUTHAL_GAP)?);
    let distance = normalize(&f64_values(df, MIN_DISTANCE)?);

    let quality: Vec<Option<f64>> = stations
        .iter()
        .zip(&gap)
        .zip(&distance)
        .map(|((n, g), d)| match (n, g, d) {
            (Some(n), Some(g), Some(d)) => Some(
                STATION_WEIGHT * n + GAP_WEIGHT * (1.0 - g) + DISTANCE_WEIGHT * (1.0 - d),
            ),
            _ => None,
        })
        .collect();

    Ok(Series::new(MONITORING_QUALITY.into(), quality))
}

fn impact_level_column(df: &DataFrame, plan: &EnrichmentPlan, rows: usize) -> Result<Series> {
    let impact: Vec<f64> = if plan.has_intensity {
        f64_values(df, COMMUNITY_INTENSITY)?
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()).unwrap_or(0.0))
            .collect()
    } else {
        vec![0.0; rows]
    };
    Ok(Series::new(IMPACT_LEVEL.into(), impact))
}
