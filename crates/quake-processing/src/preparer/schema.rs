//! Header normalisation, required-column validation and type coercion.

use polars::prelude::*;
use std::collections::HashSet;
use tracing::debug;

use crate::columns::{
    self, AZIMUTHAL_GAP, COMMUNITY_INTENSITY, DEPTH, LATITUDE, LONGITUDE, MAGNITUDE,
    MIN_DISTANCE, MONTH, REQUIRED_COLUMNS, SIGNIFICANCE, STATION_COUNT, TSUNAMI, YEAR,
};
use crate::error::{ProcessingError, Result};
use crate::utils::{column_series, has_column, i32_values};

const FLOAT_COLUMNS: [&str; 9] = [
    MAGNITUDE,
    DEPTH,
    LATITUDE,
    LONGITUDE,
    SIGNIFICANCE,
    STATION_COUNT,
    MIN_DISTANCE,
    AZIMUTHAL_GAP,
    COMMUNITY_INTENSITY,
];

const INTEGER_COLUMNS: [&str; 3] = [YEAR, MONTH, TSUNAMI];

/// Reader schema that types every measurement header as `Float64`.
///
/// Headers are matched through their canonical names but kept verbatim, so
/// the result applies to the file before `normalize_headers` runs.
pub(crate) fn float_overrides(headers: &[String]) -> Schema {
    Schema::from_iter(
        headers
            .iter()
            .filter(|header| {
                columns::canonical_name(header).is_some_and(|name| FLOAT_COLUMNS.contains(&name))
            })
            .map(|header| Field::new(header.as_str().into(), DataType::Float64)),
    )
}

/// Rename known headers to their canonical names (`Year` -> `year`, ...).
///
/// A header is only renamed when the canonical name is not already taken.
pub(crate) fn normalize_headers(df: &mut DataFrame) -> Result<()> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    let mut taken: HashSet<String> = names.iter().cloned().collect();

    for raw in &names {
        let Some(canonical) = columns::canonical_name(raw) else {
            continue;
        };
        if raw != canonical && !taken.contains(canonical) {
            df.rename(raw, canonical.into())?;
            taken.remove(raw);
            taken.insert(canonical.to_string());
            debug!("Renamed column '{}' to '{}'", raw, canonical);
        }
    }

    Ok(())
}

/// Fail with a schema error naming every missing required column.
pub(crate) fn validate_required(df: &DataFrame) -> Result<()> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|name| !has_column(df, name))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ProcessingError::missing_columns(missing))
    }
}

/// Cast known columns to their semantic types.
///
/// Measurements become `Float64`; `year`, `month` and `tsunami` become
/// `Int32`. Casts are strict, so text in a numeric column is a parse error
/// rather than a silent null. `tsunami` must hold only 0 or 1.
pub(crate) fn coerce_types(df: &mut DataFrame) -> Result<()> {
    for (names, dtype) in [
        (&FLOAT_COLUMNS[..], DataType::Float64),
        (&INTEGER_COLUMNS[..], DataType::Int32),
    ] {
        for &name in names {
            if !has_column(df, name) {
                continue;
            }
            let series = column_series(df, name)?;
            if series.dtype() == &dtype {
                continue;
            }
            let cast = series.strict_cast(&dtype).map_err(|e| {
                ProcessingError::Parse(format!("column '{name}' is not numeric: {e}"))
            })?;
            df.with_column(cast)?;
        }
    }

    validate_tsunami_flags(df)
}

fn validate_tsunami_flags(df: &DataFrame) -> Result<()> {
    let flags = i32_values(df, TSUNAMI)?;
    if let Some((row, value)) = flags
        .iter()
        .enumerate()
        .find_map(|(row, v)| v.filter(|v| !matches!(*v, 0 | 1)).map(|v| (row, v)))
    {
        return Err(ProcessingError::Parse(format!(
            "row {row}: tsunami flag must be 0 or 1, got {value}"
        )));
    }
    Ok(())
}
