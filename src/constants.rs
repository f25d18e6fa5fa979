//! Application constants for the WISP processor
//!
//! Fixed values of the instrument export format and the output
//! conventions shared by both record families.

// =============================================================================
// Source Format
// =============================================================================

/// Field separator of the instrument export
pub const FIELD_SEPARATOR: u8 = b'\t';

/// Token the instrument writes for a missing value
pub const MISSING_TOKEN: &str = "None";

/// First wavelength of the spectral axis (nm)
pub const WAVELENGTH_START: i32 = 350;

/// Last wavelength of the spectral axis (nm), inclusive
pub const WAVELENGTH_END: i32 = 900;

/// Number of samples per spectrum
pub const WAVELENGTH_COUNT: usize = (WAVELENGTH_END - WAVELENGTH_START + 1) as usize;

/// Timestamp layouts seen in exports, tried in order after RFC 3339
pub const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Timestamp layouts carrying an explicit UTC offset
pub const TIMESTAMP_FORMATS_WITH_OFFSET: &[&str] =
    &["%Y-%m-%d %H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f %z"];

// =============================================================================
// Output Conventions
// =============================================================================

pub const TIME_UNIT: &str = "seconds since 1970-01-01 00:00:00";
pub const TIME_LONG_NAME: &str = "time";
pub const WAVELENGTH_UNIT: &str = "nm";
pub const WAVELENGTH_LONG_NAME: &str = "wavelength";

/// Suffix of QA flag variables
pub const QA_SUFFIX: &str = "_qual";

/// Unit attribute of QA flag variables
pub const QA_UNIT: &str = "0 = nothing to report, 1 = more investigation";

/// Site fragment of output file names
pub const SITE_NAME: &str = "Lexplore";

/// Timestamp layout of output file names
pub const FILENAME_TIME_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Extension of output files
pub const OUTPUT_EXTENSION: &str = "nc";

/// Default processing level tag
pub const DEFAULT_LEVEL: &str = "L1";

// =============================================================================
// Storage Layout
// =============================================================================

/// Raw exports as delivered by the instrument
pub const RAW_LEVEL_DIR: &str = "Level0";

/// Processed NetCDF output
pub const PROCESSED_LEVEL_DIR: &str = "Level1";

/// Default data directory relative to the working directory
pub const DEFAULT_DATA_DIR: &str = "data";

/// Name of the data directory under the user data dir
pub const APP_DATA_DIR_NAME: &str = "lexplore-wisp";
