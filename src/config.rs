//! Configuration management and validation.
//!
//! Provides the processing configuration: storage root, processing level
//! tag, QA bounds per variable and explicit input overrides. Family schemas
//! are derived from it without touching the static definitions.

use crate::constants::{
    APP_DATA_DIR_NAME, DEFAULT_DATA_DIR, DEFAULT_LEVEL, PROCESSED_LEVEL_DIR, RAW_LEVEL_DIR,
};
use crate::error::{Result, WispError};
use crate::models::RecordFamily;
use crate::schema::{Bounds, FamilySchema};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;

/// Global configuration for WISP processing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Root holding the Level0 (raw) and Level1 (NetCDF) trees
    pub data_dir: PathBuf,

    /// Processing level tag prefixed to output names
    pub level: String,

    /// QA bounds keyed by variable name
    pub bounds: BTreeMap<String, Bounds>,

    /// Explicit inputs; when empty the Level0 tree is rescanned
    pub input_paths: Vec<PathBuf>,

    /// Suppress progress output
    pub quiet: bool,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            level: DEFAULT_LEVEL.to_string(),
            bounds: BTreeMap::new(),
            input_paths: Vec::new(),
            quiet: false,
        }
    }
}

/// `./data` when present, otherwise the per-user data directory
pub fn default_data_dir() -> PathBuf {
    let local = PathBuf::from(DEFAULT_DATA_DIR);
    if local.exists() {
        return local;
    }
    dirs::data_dir()
        .map(|dir| dir.join(APP_DATA_DIR_NAME))
        .unwrap_or(local)
}

impl ProcessorConfig {
    /// Create configuration with a custom data directory
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    /// Create configuration with a custom processing level
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Configure QA bounds for a variable
    pub fn with_bounds(mut self, variable: impl Into<String>, bounds: Bounds) -> Self {
        self.bounds.insert(variable.into(), bounds);
        self
    }

    /// Process these files instead of rescanning Level0
    pub fn with_input_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.input_paths = paths;
        self
    }

    /// Enable quiet mode
    pub fn with_quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    pub fn raw_dir(&self, family: RecordFamily) -> PathBuf {
        self.data_dir.join(RAW_LEVEL_DIR).join(family.dir_name())
    }

    pub fn output_dir(&self, family: RecordFamily) -> PathBuf {
        self.data_dir.join(PROCESSED_LEVEL_DIR).join(family.dir_name())
    }

    /// Check settings that would otherwise fail late
    pub fn validate(&self) -> Result<()> {
        if self.level.trim().is_empty() {
            return Err(WispError::Configuration {
                message: "Processing level must not be empty".to_string(),
            });
        }
        if self.level.contains(std::path::MAIN_SEPARATOR) || self.level.contains('/') {
            return Err(WispError::Configuration {
                message: format!("Processing level '{}' contains a path separator", self.level),
            });
        }

        for (name, bounds) in &self.bounds {
            if let (Some(min), Some(max)) = (bounds.min, bounds.max) {
                if min > max {
                    return Err(WispError::Configuration {
                        message: format!("Bounds for '{}' have min {} above max {}", name, min, max),
                    });
                }
            }
            let known = RecordFamily::ALL
                .iter()
                .any(|f| FamilySchema::for_family(*f).variable(name).is_some());
            if !known {
                return Err(WispError::Configuration {
                    message: format!("Bounds configured for unknown variable '{}'", name),
                });
            }
        }

        Ok(())
    }

    /// Family schema with the configured QA bounds applied
    pub fn schema_for(&self, family: RecordFamily) -> Result<FamilySchema> {
        let mut schema = FamilySchema::for_family(family);
        for (name, bounds) in &self.bounds {
            if schema.variable(name).is_some() {
                debug!("Applying bounds {:?} to {}:{}", bounds, family, name);
                schema = schema.with_bounds(name, *bounds)?;
            }
        }
        Ok(schema)
    }
}
