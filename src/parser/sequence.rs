//! Decoder for spectrum cells.
//!
//! Spectral exports embed a whole spectrum in one cell as a bracketed,
//! comma-separated list with one value per wavelength (350 → 900 nm).
//! Cells are decoded strictly: brackets are required, every token must be
//! numeric and the value count must equal the wavelength count.

use crate::constants::{WAVELENGTH_END, WAVELENGTH_START};
use crate::error::{Result, WispError};
use crate::models::{Sample, Variable};
use crate::schema::VariableSpec;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SequenceError {
    #[error("expected a bracketed list")]
    MissingBrackets,

    #[error("empty value at position {index}")]
    EmptyToken { index: usize },

    #[error("non-numeric value '{token}' at position {index}")]
    NonNumeric { index: usize, token: String },

    #[error("expected {expected} values, found {found}")]
    WrongLength { expected: usize, found: usize },
}

/// Synthesised wavelength axis in nm
pub fn wavelength_axis() -> Vec<i32> {
    (WAVELENGTH_START..=WAVELENGTH_END).collect()
}

/// Decode one spectrum cell into exactly `expected_len` values
pub fn decode_spectrum(
    cell: &str,
    expected_len: usize,
) -> std::result::Result<Vec<f64>, SequenceError> {
    let inner = cell
        .trim()
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or(SequenceError::MissingBrackets)?;

    if inner.trim().is_empty() {
        return Err(SequenceError::WrongLength {
            expected: expected_len,
            found: 0,
        });
    }

    let mut values = Vec::with_capacity(expected_len);
    for (index, token) in inner.split(',').enumerate() {
        let token = token.trim();
        if token.is_empty() {
            return Err(SequenceError::EmptyToken { index });
        }
        let value = token
            .parse::<f64>()
            .map_err(|_| SequenceError::NonNumeric {
                index,
                token: token.to_string(),
            })?;
        values.push(value);
    }

    if values.len() != expected_len {
        return Err(SequenceError::WrongLength {
            expected: expected_len,
            found: values.len(),
        });
    }

    Ok(values)
}

/// Decode a spectrum column and store it wavelength-major as (M, N)
pub fn spectrum_variable(
    path: &Path,
    spec: &VariableSpec,
    cells: &[Option<&str>],
    wavelength_count: usize,
) -> Result<Variable> {
    let rows = cells
        .iter()
        .enumerate()
        .map(|(row, cell)| {
            let text = cell.ok_or_else(|| WispError::MissingValue {
                path: path.to_path_buf(),
                column: spec.name.clone(),
                row,
            })?;
            decode_spectrum(text, wavelength_count).map_err(|e| WispError::MalformedSequence {
                path: path.to_path_buf(),
                column: spec.name.clone(),
                row,
                reason: e.to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(transpose_rows(&spec.name, &rows, wavelength_count))
}

/// Rows of (time, wavelength) into a (wavelength, time) variable
fn transpose_rows(name: &str, rows: &[Vec<f64>], wavelength_count: usize) -> Variable {
    let n = rows.len();
    let mut samples = Vec::with_capacity(wavelength_count * n);
    for w in 0..wavelength_count {
        samples.extend(rows.iter().map(|row| Sample::Number(row[w])));
    }
    Variable::new(name, vec![wavelength_count, n], samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::WAVELENGTH_COUNT;
    use crate::schema::FamilySchema;

    fn spectrum_text(values: impl Iterator<Item = f64>) -> String {
        let parts: Vec<String> = values.map(|v| v.to_string()).collect();
        format!("[{}]", parts.join(", "))
    }

    #[test]
    fn test_wavelength_axis() {
        let axis = wavelength_axis();
        assert_eq!(axis.len(), WAVELENGTH_COUNT);
        assert_eq!(axis.len(), 551);
        assert_eq!(axis.first(), Some(&350));
        assert_eq!(axis.last(), Some(&900));
    }

    #[test]
    fn test_decode_full_spectrum_in_wavelength_order() {
        let cell = spectrum_text((0..551).map(|i| i as f64 / 1000.0));
        let values = decode_spectrum(&cell, 551).unwrap();

        assert_eq!(values.len(), 551);
        assert_eq!(values[0], 0.0);
        assert_eq!(values[1], 0.001);
        assert_eq!(values[550], 0.55);
    }

    #[test]
    fn test_decode_accepts_nan_and_whitespace() {
        assert_eq!(decode_spectrum(" [1, 2 ,3] ", 3).unwrap(), vec![1.0, 2.0, 3.0]);
        let values = decode_spectrum("[nan, 1e-3]", 2).unwrap();
        assert!(values[0].is_nan());
        assert_eq!(values[1], 0.001);
    }

    #[test]
    fn test_decode_rejects_malformed_cells() {
        assert_eq!(
            decode_spectrum("1, 2, 3", 3),
            Err(SequenceError::MissingBrackets)
        );
        assert_eq!(
            decode_spectrum("[1, 2", 2),
            Err(SequenceError::MissingBrackets)
        );
        assert_eq!(
            decode_spectrum("[1, , 3]", 3),
            Err(SequenceError::EmptyToken { index: 1 })
        );
        assert_eq!(
            decode_spectrum("[1, __import__('os'), 3]", 3),
            Err(SequenceError::NonNumeric {
                index: 1,
                token: "__import__('os')".to_string()
            })
        );
        assert_eq!(
            decode_spectrum("[1, 2]", 3),
            Err(SequenceError::WrongLength {
                expected: 3,
                found: 2
            })
        );
        assert_eq!(
            decode_spectrum("[1, 2, 3, 4]", 3),
            Err(SequenceError::WrongLength {
                expected: 3,
                found: 4
            })
        );
        assert_eq!(
            decode_spectrum("[]", 3),
            Err(SequenceError::WrongLength {
                expected: 3,
                found: 0
            })
        );
    }

    #[test]
    fn test_spectrum_variable_is_transposed() {
        let schema = FamilySchema::spectral();
        let spec = schema.variable("downirr").unwrap();
        let cells = [Some("[1, 2, 3]"), Some("[4, 5, 6]")];

        let var = spectrum_variable(Path::new("s.txt"), spec, &cells, 3).unwrap();

        assert_eq!(var.shape, vec![3, 2]);
        // (wavelength, time)
        assert_eq!(var.get(&[0, 0]), Some(&Sample::Number(1.0)));
        assert_eq!(var.get(&[0, 1]), Some(&Sample::Number(4.0)));
        assert_eq!(var.get(&[2, 0]), Some(&Sample::Number(3.0)));
        assert_eq!(var.get(&[2, 1]), Some(&Sample::Number(6.0)));
    }

    #[test]
    fn test_spectrum_variable_errors_carry_context() {
        let schema = FamilySchema::spectral();
        let spec = schema.variable("rsr").unwrap();

        let err = spectrum_variable(Path::new("s.txt"), spec, &[Some("[1, 2, 3]"), Some("[1]")], 3)
            .unwrap_err();
        match err {
            WispError::MalformedSequence { column, row, .. } => {
                assert_eq!(column, "rsr");
                assert_eq!(row, 1);
            }
            other => panic!("Expected MalformedSequence, got {:?}", other),
        }

        assert!(matches!(
            spectrum_variable(Path::new("s.txt"), spec, &[None], 3),
            Err(WispError::MissingValue { .. })
        ));
    }
}
