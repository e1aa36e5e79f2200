//! Pairwise correlation between numeric columns.
//!
//! Each coefficient uses only the rows where both columns have a value
//! (pairwise-complete). A pair with fewer than two such rows, or where either
//! side is constant, has no defined coefficient and is reported as `None`.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::columns::{HIGH_MAGNITUDE, IS_SHALLOW, MONTH, OCEANIC_EVENT, YEAR};
use crate::error::{ProcessingError, Result};
use crate::utils::{f64_values, numeric_column_names};

/// Columns that are identifiers or flags rather than measurements.
const EXCLUDED_FROM_DEFAULT: [&str; 5] = [YEAR, MONTH, IS_SHALLOW, HIGH_MAGNITUDE, OCEANIC_EVENT];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CorrelationMethod {
    /// Linear (product-moment) correlation.
    Pearson,
    /// Rank correlation; tied values share their average rank.
    #[default]
    Spearman,
}

impl fmt::Display for CorrelationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pearson => f.write_str("pearson"),
            Self::Spearman => f.write_str("spearman"),
        }
    }
}

/// One off-diagonal entry of a correlation matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPair {
    pub left: String,
    pub right: String,
    pub coefficient: f64,
}

/// Symmetric matrix of coefficients, indexed by column name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub method: CorrelationMethod,
    pub columns: Vec<String>,
    /// Row-major coefficients; `values[i][j]` pairs `columns[i]` and `columns[j]`.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Coefficient for two columns, if both are in the matrix and it is defined.
    pub fn get(&self, left: &str, right: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == left)?;
        let j = self.columns.iter().position(|c| c == right)?;
        self.values[i][j]
    }

    /// The `n` distinct column pairs with the largest absolute coefficient.
    pub fn strongest_pairs(&self, n: usize) -> Vec<CorrelationPair> {
        let mut pairs: Vec<CorrelationPair> = Vec::new();
        for i in 0..self.columns.len() {
            for j in (i + 1)..self.columns.len() {
                if let Some(coefficient) = self.values[i][j] {
                    pairs.push(CorrelationPair {
                        left: self.columns[i].clone(),
                        right: self.columns[j].clone(),
                        coefficient,
                    });
                }
            }
        }
        pairs.sort_by(|a, b| b.coefficient.abs().total_cmp(&a.coefficient.abs()));
        pairs.truncate(n);
        pairs
    }
}

/// Numeric measurement columns of `df`, in table order.
pub fn default_correlation_columns(df: &DataFrame) -> Vec<String> {
    numeric_column_names(df)
        .into_iter()
        .filter(|name| !EXCLUDED_FROM_DEFAULT.contains(&name.as_str()))
        .collect()
}

/// Correlate every pair of `columns`.
pub fn correlation_matrix<S: AsRef<str>>(
    df: &DataFrame,
    columns: &[S],
    method: CorrelationMethod,
) -> Result<CorrelationMatrix> {
    if columns.is_empty() {
        return Err(ProcessingError::InvalidCriteria(
            "correlation needs at least one column".to_string(),
        ));
    }

    let names: Vec<String> = columns.iter().map(|c| c.as_ref().to_string()).collect();
    let data = names
        .iter()
        .map(|name| f64_values(df, name))
        .collect::<Result<Vec<_>>>()?;

    let k = names.len();
    let mut values = vec![vec![None; k]; k];
    for i in 0..k {
        for j in i..k {
            let coefficient = pairwise(&data[i], &data[j], method);
            values[i][j] = coefficient;
            values[j][i] = coefficient;
        }
    }

    Ok(CorrelationMatrix {
        method,
        columns: names,
        values,
    })
}

fn pairwise(x: &[Option<f64>], y: &[Option<f64>], method: CorrelationMethod) -> Option<f64> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) if !a.is_nan() && !b.is_nan() => Some((*a, *b)),
            _ => None,
        })
        .unzip();

    match method {
        CorrelationMethod::Pearson => pearson(&xs, &ys),
        CorrelationMethod::Spearman => pearson(&average_ranks(&xs), &average_ranks(&ys)),
    }
}

pub(crate) fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len();
    if n < 2 || n != y.len() {
        return None;
    }
    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let (dx, dy) = (a - mean_x, b - mean_y);
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

/// 1-based ranks; ties get the mean of the ranks they span.
pub(crate) fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start;
        while end + 1 < order.len() && values[order[end + 1]] == values[order[start]] {
            end += 1;
        }
        let rank = (start + end) as f64 / 2.0 + 1.0;
        for &idx in &order[start..=end] {
            ranks[idx] = rank;
        }
        start = end + 1;
    }
    ranks
}
