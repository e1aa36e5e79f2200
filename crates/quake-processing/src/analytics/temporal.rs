//! Per-year and per-month aggregates.

use chrono::Month;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::columns::{DEPTH, MAGNITUDE, MONTH, SIGNIFICANCE, TSUNAMI, YEAR};
use crate::error::{Result, ResultExt};
use crate::utils::{f64_values, i32_values};

const EVENT_COUNT: &str = "event_count";
const MAG_MEAN: &str = "mag_mean";
const MAG_MAX: &str = "mag_max";
const TSUNAMI_COUNT: &str = "tsunami_count";
const DEPTH_MEAN: &str = "depth_mean";
const SIG_MEAN: &str = "sig_mean";

/// Aggregates for one calendar year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyStats {
    pub year: i32,
    pub event_count: usize,
    pub mag_mean: Option<f64>,
    pub mag_max: Option<f64>,
    pub tsunami_count: usize,
    pub depth_mean: Option<f64>,
    pub sig_mean: Option<f64>,
}

/// Aggregates for one month of the year, pooled across years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyStats {
    pub month: u32,
    pub month_name: String,
    pub event_count: usize,
    pub mag_mean: Option<f64>,
    pub tsunami_count: usize,
    pub depth_mean: Option<f64>,
}

/// Group events by `year`, sorted ascending.
pub fn yearly_stats(df: &DataFrame) -> Result<Vec<YearlyStats>> {
    let agg = df
        .clone()
        .lazy()
        .group_by([col(YEAR)])
        .agg([
            len().alias(EVENT_COUNT),
            col(MAGNITUDE).mean().alias(MAG_MEAN),
            col(MAGNITUDE).max().alias(MAG_MAX),
            col(TSUNAMI).sum().alias(TSUNAMI_COUNT),
            col(DEPTH).mean().alias(DEPTH_MEAN),
            col(SIGNIFICANCE).mean().alias(SIG_MEAN),
        ])
        .sort([YEAR], SortMultipleOptions::default())
        .collect()
        .context("Computing yearly statistics")?;

    let years = i32_values(&agg, YEAR)?;
    let counts = i32_values(&agg, EVENT_COUNT)?;
    let mag_mean = f64_values(&agg, MAG_MEAN)?;
    let mag_max = f64_values(&agg, MAG_MAX)?;
    let tsunamis = i32_values(&agg, TSUNAMI_COUNT)?;
    let depth_mean = f64_values(&agg, DEPTH_MEAN)?;
    let sig_mean = f64_values(&agg, SIG_MEAN)?;

    Ok((0..agg.height())
        .filter_map(|i| {
            Some(YearlyStats {
                year: years[i]?,
                event_count: count(counts[i]),
                mag_mean: mag_mean[i],
                mag_max: mag_max[i],
                tsunami_count: count(tsunamis[i]),
                depth_mean: depth_mean[i],
                sig_mean: sig_mean[i],
            })
        })
        .collect())
}

/// Group events by `month` (1-12) across all years, sorted by month.
pub fn monthly_stats(df: &DataFrame) -> Result<Vec<MonthlyStats>> {
    let agg = df
        .clone()
        .lazy()
        .group_by([col(MONTH)])
        .agg([
            len().alias(EVENT_COUNT),
            col(MAGNITUDE).mean().alias(MAG_MEAN),
            col(TSUNAMI).sum().alias(TSUNAMI_COUNT),
            col(DEPTH).mean().alias(DEPTH_MEAN),
        ])
        .sort([MONTH], SortMultipleOptions::default())
        .collect()
        .context("Computing monthly statistics")?;

    let months = i32_values(&agg, MONTH)?;
    let counts = i32_values(&agg, EVENT_COUNT)?;
    let mag_mean = f64_values(&agg, MAG_MEAN)?;
    let tsunamis = i32_values(&agg, TSUNAMI_COUNT)?;
    let depth_mean = f64_values(&agg, DEPTH_MEAN)?;

    Ok((0..agg.height())
        .filter_map(|i| {
            let month = u32::try_from(months[i]?).ok()?;
            Some(MonthlyStats {
                month,
                month_name: month_name(month)?.to_string(),
                event_count: count(counts[i]),
                mag_mean: mag_mean[i],
                tsunami_count: count(tsunamis[i]),
                depth_mean: depth_mean[i],
            })
        })
        .collect())
}

/// English name of a 1-based month number.
pub fn month_name(month: u32) -> Option<&'static str> {
    let month = u8::try_from(month).ok()?;
    Month::try_from(month).ok().map(|m| m.name())
}

fn count(value: Option<i32>) -> usize {
    value.and_then(|v| usize::try_from(v).ok()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn events() -> DataFrame {
        df![
            "magnitude" => [7.0f64, 8.0, 6.5, 7.5],
            "depth" => [10.0f64, 30.0, 100.0, 20.0],
            "tsunami" => [1i32, 1, 0, 0],
            "year" => [2012i32, 2012, 2001, 2012],
            "month" => [3i32, 3, 11, 1],
            "sig" => [700.0f64, 900.0, 650.0, 800.0],
        ]
        .unwrap()
    }

    #[test]
    fn test_yearly_stats() {
        let stats = yearly_stats(&events()).unwrap();
        assert_eq!(stats.len(), 2);

        assert_eq!(
            stats[0],
            YearlyStats {
                year: 2001,
                event_count: 1,
                mag_mean: Some(6.5),
                mag_max: Some(6.5),
                tsunami_count: 0,
                depth_mean: Some(100.0),
                sig_mean: Some(650.0),
            }
        );
        assert_eq!(stats[1].year, 2012);
        assert_eq!(stats[1].event_count, 3);
        assert_eq!(stats[1].tsunami_count, 2);
        assert_eq!(stats[1].mag_max, Some(8.0));
        assert_eq!(stats[1].depth_mean, Some(20.0));
    }

    #[test]
    fn test_monthly_stats() {
        let stats = monthly_stats(&events()).unwrap();
        let months: Vec<u32> = stats.iter().map(|s| s.month).collect();
        assert_eq!(months, vec![1, 3, 11]);
        assert_eq!(stats[1].month_name, "March");
        assert_eq!(stats[1].event_count, 2);
        assert_eq!(stats[1].mag_mean, Some(7.5));
        assert_eq!(stats[2].month_name, "November");
    }

    #[test]
    fn test_stats_of_empty_table() {
        let empty = events().head(Some(0));
        assert!(yearly_stats(&empty).unwrap().is_empty());
        assert!(monthly_stats(&empty).unwrap().is_empty());
    }

    #[test]
    fn test_month_name() {
        assert_eq!(month_name(1), Some("January"));
        assert_eq!(month_name(12), Some("December"));
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
    }
}
