//! Parser for WISPstation text exports
//!
//! Turns one tab-delimited export into a [`Dataset`](crate::models::Dataset)
//! shaped by a [`FamilySchema`](crate::schema::FamilySchema), or reports that
//! the export carries no data.
//!
//! ## Architecture
//!
//! - [`reader`] - Header offset handling, body loading and dataset assembly
//! - [`field_parsers`] - Timestamp, measurement and selector cell parsing
//! - [`sequence`] - Strict decoder for the embedded spectrum cells
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use wisp_processor::models::ParseOutcome;
//! use wisp_processor::parser::parse_file;
//! use wisp_processor::schema::FamilySchema;
//!
//! # fn example() -> wisp_processor::error::Result<()> {
//! let schema = FamilySchema::water_quality();
//! match parse_file(Path::new("Lexplore_Water_Quality_2021-06-01.txt"), &schema)? {
//!     ParseOutcome::Data(dataset) => println!("{} rows", dataset.len()),
//!     ParseOutcome::NoData => println!("no data"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod field_parsers;
pub mod reader;
pub mod sequence;

#[cfg(test)]
mod tests;

pub use reader::parse_file;
pub use sequence::{SequenceError, decode_spectrum, wavelength_axis};
