//! Tsunami vs. non-tsunami comparison of a numeric column.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::columns::TSUNAMI;
use crate::error::Result;
use crate::utils::{f64_values, finite_values, i32_values, mean, median, quantile, std_dev};

/// Summary statistics of one column within one group.
///
/// Quartiles interpolate linearly between ranks and `std` is the sample
/// standard deviation, which is `None` for fewer than two values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q1: Option<f64>,
    pub median: Option<f64>,
    pub q3: Option<f64>,
    pub max: Option<f64>,
}

impl GroupStats {
    fn from_values(values: &[f64]) -> Self {
        Self {
            count: values.len(),
            mean: mean(values),
            std: std_dev(values),
            min: quantile(values, 0.0),
            q1: quantile(values, 0.25),
            median: median(values),
            q3: quantile(values, 0.75),
            max: quantile(values, 1.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TsunamiComparison {
    pub column: String,
    pub with_tsunami: GroupStats,
    pub without_tsunami: GroupStats,
}

/// Compare `column` between events with and without a tsunami.
///
/// Missing and NaN values are left out of both groups, so `count` is the
/// number of usable values rather than the number of rows.
pub fn compare_by_tsunami(df: &DataFrame, column: &str) -> Result<TsunamiComparison> {
    let values = f64_values(df, column)?;
    let flags = i32_values(df, TSUNAMI)?;

    let mut with = Vec::new();
    let mut without = Vec::new();
    for (value, flag) in values.iter().zip(&flags) {
        match flag {
            Some(1) => with.push(*value),
            Some(0) => without.push(*value),
            _ => {}
        }
    }

    Ok(TsunamiComparison {
        column: column.to_string(),
        with_tsunami: GroupStats::from_values(&finite_values(&with)),
        without_tsunami: GroupStats::from_values(&finite_values(&without)),
    })
}
