//! Error handling for WISP processing operations.
//!
//! Provides error types with file context for header parsing, body
//! parsing, schema validation, and NetCDF serialization failures.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WispError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("NetCDF error: {0}")]
    NetCdf(#[from] netcdf::Error),

    #[error("Header parsing failed for file: {path} - {reason}")]
    HeaderParsingFailed { path: PathBuf, reason: String },

    #[error(
        "Schema mismatch in {family} file {path}: expected {expected} columns, found {found}"
    )]
    SchemaMismatch {
        family: String,
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    #[error("Invalid timestamp '{value}' in file {path}, row {row}")]
    InvalidTimestamp {
        path: PathBuf,
        row: usize,
        value: String,
    },

    #[error("Unrecognised code '{token}' in column '{column}' of file {path}, row {row}")]
    UnknownCategory {
        path: PathBuf,
        column: String,
        row: usize,
        token: String,
    },

    #[error("Malformed sequence in column '{column}' of file {path}, row {row}: {reason}")]
    MalformedSequence {
        path: PathBuf,
        column: String,
        row: usize,
        reason: String,
    },

    #[error("Missing value in column '{column}' of file {path}, row {row}")]
    MissingValue {
        path: PathBuf,
        column: String,
        row: usize,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Processing failed for file: {path} - {reason}")]
    ProcessingFailed { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, WispError>;
