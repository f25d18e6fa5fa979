//! WISP Processor Library
//!
//! Converts the text exports of the Lexplore WISPstation, a hyperspectral
//! water-monitoring radiometer, into self-describing NetCDF files.
//!
//! This library provides tools for:
//! - Locating the data section of an export from its declared line count
//! - Parsing the WaterQuality and Spectral record families against fixed schemas
//! - Decoding bracketed 551-value spectra onto the 350-900 nm wavelength axis
//! - Deriving `_qual` flag arrays for every measured variable
//! - Writing one NetCDF file per export, replacing previous runs

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod header;
pub mod models;
pub mod parser;
pub mod processor;
pub mod quality;
pub mod schema;
pub mod writer;

// Re-export commonly used types
pub use config::ProcessorConfig;
pub use error::{Result, WispError};
pub use models::{BatchReport, Dataset, ParseOutcome, ProcessingStats, RecordFamily, Sample};
pub use processor::Processor;
pub use schema::{Bounds, FamilySchema};
