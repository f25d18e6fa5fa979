//! Field parsing utilities for WISP export cells
//!
//! Helpers for turning raw text cells into timestamps, measurement samples
//! and selector codes with file/row context on failure.

use crate::constants::{MISSING_TOKEN, TIMESTAMP_FORMATS, TIMESTAMP_FORMATS_WITH_OFFSET};
use crate::error::{Result, WispError};
use crate::models::{Sample, Variable};
use crate::schema::{CategoricalMap, VariableSpec};
use chrono::{DateTime, NaiveDateTime};
use std::path::Path;

/// Normalise a raw cell: trims whitespace and maps empty cells and the
/// `None` token to a missing value
pub fn clean_cell(cell: Option<&str>) -> Option<&str> {
    cell.map(str::trim)
        .filter(|s| !s.is_empty() && *s != MISSING_TOKEN)
}

/// Parse an export timestamp to whole seconds since the Unix epoch (UTC)
pub fn parse_timestamp(value: &str) -> Option<i64> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp());
    }

    for format in TIMESTAMP_FORMATS_WITH_OFFSET {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(dt.timestamp());
        }
    }

    // Naive timestamps are UTC
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc().timestamp())
}

/// Parse the time column; every data row must carry a valid timestamp
pub fn parse_time_column(path: &Path, cells: &[Option<&str>]) -> Result<Vec<i64>> {
    cells
        .iter()
        .enumerate()
        .map(|(row, cell)| {
            let value = cell.ok_or_else(|| WispError::MissingValue {
                path: path.to_path_buf(),
                column: "time".to_string(),
                row,
            })?;
            parse_timestamp(value).ok_or_else(|| WispError::InvalidTimestamp {
                path: path.to_path_buf(),
                row,
                value: value.to_string(),
            })
        })
        .collect()
}

/// Numeric probe for a measurement cell
pub fn parse_measurement(cell: Option<&str>) -> Sample {
    match cell {
        None => Sample::Missing,
        Some(text) => match text.parse::<f64>() {
            Ok(value) => Sample::Number(value),
            Err(_) => Sample::Invalid(text.to_string()),
        },
    }
}

/// Build a rank-1 measurement variable. Non-numeric text is kept for QA
/// rather than rejected.
pub fn measurement_variable(spec: &VariableSpec, cells: &[Option<&str>]) -> Variable {
    let samples = cells.iter().map(|cell| parse_measurement(*cell)).collect();
    Variable::new(spec.name.clone(), vec![cells.len()], samples)
}

/// Build a selector variable by mapping each code through its table
pub fn selector_variable(
    path: &Path,
    spec: &VariableSpec,
    map: &CategoricalMap,
    cells: &[Option<&str>],
) -> Result<Variable> {
    let samples = cells
        .iter()
        .enumerate()
        .map(|(row, cell)| match cell {
            None => Ok(Sample::Missing),
            Some(token) => map
                .code(token)
                .map(Sample::Number)
                .ok_or_else(|| WispError::UnknownCategory {
                    path: path.to_path_buf(),
                    column: spec.name.clone(),
                    row,
                    token: token.to_string(),
                }),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Variable::new(spec.name.clone(), vec![cells.len()], samples))
}
