//! Core export reader
//!
//! Locates the tabular body using the header line count, loads it with
//! Polars as untyped text, validates it against the family schema and
//! assembles the dataset column by column.

use std::path::Path;

use polars::prelude::*;
use tracing::{debug, info};

use super::field_parsers::{clean_cell, measurement_variable, parse_time_column, selector_variable};
use super::sequence::{spectrum_variable, wavelength_axis};
use crate::constants::{FIELD_SEPARATOR, MISSING_TOKEN, WAVELENGTH_COUNT};
use crate::error::{Result, WispError};
use crate::header::{HeaderLayout, parse_header_layout};
use crate::models::{Dataset, ParseOutcome};
use crate::schema::{Axis, FamilySchema};

/// Parse one export into a dataset, or report that it holds no data
pub fn parse_file(path: &Path, schema: &FamilySchema) -> Result<ParseOutcome> {
    debug!("Parsing {} export: {}", schema.family, path.display());

    let layout = parse_header_layout(path)?;
    if layout.data_rows() == 0 {
        info!("File {} contains no data rows", display_name(path));
        return Ok(ParseOutcome::NoData);
    }

    let body = read_body(path, &layout)?;
    if body.height() == 0 {
        info!("File {} contains no data rows", display_name(path));
        return Ok(ParseOutcome::NoData);
    }

    // Source headers are ignored; columns are addressed by schema position
    schema.validate_columns(body.width(), path)?;

    let time_cells = column_cells(&body, schema, "time", path)?;
    if time_cells.len() == 1 && time_cells[0].is_none() {
        info!("File {} contains no data", display_name(path));
        return Ok(ParseOutcome::NoData);
    }

    let time = parse_time_column(path, &time_cells)?;

    let mut variables = Vec::with_capacity(schema.variables.len());
    for spec in &schema.variables {
        let cells = column_cells(&body, schema, &spec.name, path)?;
        let variable = match &spec.selector {
            Some(map) => selector_variable(path, spec, map, &cells)?,
            None if spec.rank() == 1 => measurement_variable(spec, &cells),
            None => spectrum_variable(path, spec, &cells, WAVELENGTH_COUNT)?,
        };
        variables.push(variable);
    }

    let wavelength = schema.has_axis(Axis::Wavelength).then(wavelength_axis);

    debug!(
        "Parsed {} rows and {} variables from {}",
        time.len(),
        variables.len(),
        path.display()
    );

    Ok(ParseOutcome::Data(Dataset {
        family: schema.family,
        source: path.to_path_buf(),
        time,
        wavelength,
        variables,
    }))
}

/// Load the body rows as text columns
fn read_body(path: &Path, layout: &HeaderLayout) -> Result<DataFrame> {
    let parse_options = CsvParseOptions::default()
        .with_separator(FIELD_SEPARATOR)
        .with_quote_char(None)
        .with_missing_is_null(true)
        .with_null_values(Some(NullValues::AllColumnsSingle(MISSING_TOKEN.into())));

    let df = CsvReadOptions::default()
        .with_has_header(false)
        .with_skip_rows(layout.body_start)
        .with_infer_schema_length(Some(0))
        .with_parse_options(parse_options)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    Ok(df)
}

/// Cleaned cells of a schema column
fn column_cells<'a>(
    body: &'a DataFrame,
    schema: &FamilySchema,
    name: &str,
    path: &Path,
) -> Result<Vec<Option<&'a str>>> {
    let index = schema
        .column_index(name)
        .ok_or_else(|| WispError::ProcessingFailed {
            path: path.to_path_buf(),
            reason: format!("Column '{}' is not part of the {} layout", name, schema.family),
        })?;

    let column = body
        .get_columns()
        .get(index)
        .ok_or_else(|| WispError::SchemaMismatch {
            family: schema.family.to_string(),
            path: path.to_path_buf(),
            expected: schema.columns.len(),
            found: body.width(),
        })?;

    let text = column.as_materialized_series().str()?;
    Ok(text.into_iter().map(clean_cell).collect())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
