//! Header metrics for a loaded dataset.

use polars::prelude::*;

use crate::columns::{DEPTH, MAGNITUDE, TSUNAMI, YEAR};
use crate::error::Result;
use crate::types::{DatasetSummary, percentage};
use crate::utils::{f64_values, has_column, i32_values, min_max};

const EMPTY_RANGE: &str = "n/a";

/// Summarise a table: size, tsunami share and the span of year, magnitude
/// and depth.
///
/// Read-only. An empty table yields zero counts, a 0% tsunami share and
/// `"n/a"` ranges.
pub fn describe(df: &DataFrame) -> Result<DatasetSummary> {
    let total_events = df.height();
    let tsunami_events = count_tsunami_events(df)?;

    let years: Vec<i32> = i32_values(df, YEAR)?.into_iter().flatten().collect();
    let year_min = years.iter().min().copied();
    let year_max = years.iter().max().copied();
    let years_span = match (year_min, year_max) {
        (Some(lo), Some(hi)) => format!("{lo}-{hi}"),
        _ => EMPTY_RANGE.to_string(),
    };

    let magnitude = min_max(&f64_values(df, MAGNITUDE)?);
    let depth = min_max(&f64_values(df, DEPTH)?);

    Ok(DatasetSummary {
        total_events,
        tsunami_events,
        tsunami_percentage: percentage(tsunami_events, total_events),
        year_min,
        year_max,
        years_span,
        magnitude_min: magnitude.map(|(lo, _)| lo),
        magnitude_max: magnitude.map(|(_, hi)| hi),
        magnitude_range: format_range(magnitude, ""),
        depth_min: depth.map(|(lo, _)| lo),
        depth_max: depth.map(|(_, hi)| hi),
        depth_range: format_range(depth, " km"),
    })
}

/// Number of rows whose tsunami flag is set. A table without a `tsunami`
/// column has none.
pub(crate) fn count_tsunami_events(df: &DataFrame) -> Result<usize> {
    if !has_column(df, TSUNAMI) {
        return Ok(0);
    }
    Ok(i32_values(df, TSUNAMI)?
        .into_iter()
        .filter(|flag| *flag == Some(1))
        .count())
}

fn format_range(range: Option<(f64, f64)>, unit: &str) -> String {
    match range {
        Some((lo, hi)) => format!("{lo:.1} - {hi:.1}{unit}"),
        None => EMPTY_RANGE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_describe_basic() {
        let df = df![
            "magnitude" => [7.2f64, 5.0, 8.1],
            "depth" => [20.0f64, 100.0, 35.5],
            "tsunami" => [1i32, 0, 1],
            "year" => [2010i32, 2001, 2022],
        ]
        .unwrap();

        let summary = describe(&df).unwrap();
        assert_eq!(summary.total_events, 3);
        assert_eq!(summary.tsunami_events, 2);
        assert!((summary.tsunami_percentage - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.years_span, "2001-2022");
        assert_eq!(summary.magnitude_range, "5.0 - 8.1");
        assert_eq!(summary.depth_range, "20.0 - 100.0 km");
        assert_eq!(summary.magnitude_min, Some(5.0));
        assert_eq!(summary.depth_max, Some(100.0));
    }

    #[test]
    fn test_describe_empty_table() {
        let df = df![
            "magnitude" => Vec::<f64>::new(),
            "depth" => Vec::<f64>::new(),
            "tsunami" => Vec::<i32>::new(),
            "year" => Vec::<i32>::new(),
        ]
        .unwrap();

        let summary = describe(&df).unwrap();
        assert_eq!(summary.total_events, 0);
        assert_eq!(summary.tsunami_events, 0);
        assert_eq!(summary.tsunami_percentage, 0.0);
        assert_eq!(summary.years_span, "n/a");
        assert_eq!(summary.year_min, None);
        assert_eq!(summary.magnitude_range, "n/a");
    }

    #[test]
    fn test_count_without_tsunami_column() {
        let df = df!["magnitude" => [7.0f64]].unwrap();
        assert_eq!(count_tsunami_events(&df).unwrap(), 0);
    }
}
