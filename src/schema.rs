//! Family schemas and the variable registry.
//!
//! A [`FamilySchema`] is the explicit, versioned description of one WISP
//! export layout: source column order, axes, variables with their units and
//! long names, categorical selector codes, global attributes and the output
//! naming tag. The parser validates files against it instead of trusting the
//! header row of the export.

use crate::constants::{
    QA_SUFFIX, QA_UNIT, TIME_LONG_NAME, TIME_UNIT, WAVELENGTH_LONG_NAME, WAVELENGTH_UNIT,
};
use crate::error::{Result, WispError};
use crate::models::RecordFamily;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Named dimensions of the output file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Time,
    Wavelength,
}

impl Axis {
    pub fn name(&self) -> &'static str {
        match self {
            Axis::Time => "time",
            Axis::Wavelength => "wavelength",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Axis::Time => TIME_UNIT,
            Axis::Wavelength => WAVELENGTH_UNIT,
        }
    }

    pub fn long_name(&self) -> &'static str {
        match self {
            Axis::Time => TIME_LONG_NAME,
            Axis::Wavelength => WAVELENGTH_LONG_NAME,
        }
    }
}

/// Optional QA thresholds for a variable
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Bounds {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// Parse `min:max` where either side may be empty, e.g. `0:`, `:50`, `0:50`
    pub fn parse(spec: &str) -> Option<Self> {
        let (min, max) = spec.split_once(':')?;
        let side = |s: &str| -> Option<Option<f64>> {
            let s = s.trim();
            if s.is_empty() {
                Some(None)
            } else {
                s.parse::<f64>().ok().map(Some)
            }
        };
        Some(Self {
            min: side(min)?,
            max: side(max)?,
        })
    }
}

/// Two-valued code table for a selector column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalMap {
    pub codes: [(String, u8); 2],
}

impl CategoricalMap {
    pub fn new(zero: &str, one: &str) -> Self {
        Self {
            codes: [(zero.to_string(), 0), (one.to_string(), 1)],
        }
    }

    /// Numeric code for a source token
    pub fn code(&self, token: &str) -> Option<f64> {
        self.codes
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, c)| f64::from(*c))
    }

    /// Source token for a numeric code
    pub fn token(&self, code: f64) -> Option<&str> {
        self.codes
            .iter()
            .find(|(_, c)| f64::from(*c) == code)
            .map(|(t, _)| t.as_str())
    }

    /// Unit string describing the mapping, e.g. `LdS = 0, LdP = 1`
    pub fn describe(&self) -> String {
        self.codes
            .iter()
            .map(|(t, c)| format!("{} = {}", t, c))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Registry entry for one output variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableSpec {
    pub name: String,
    pub axes: Vec<Axis>,
    pub unit: String,
    pub long_name: String,
    pub bounds: Option<Bounds>,
    /// Present for pure categorical selector variables, which are exempt from QA
    pub selector: Option<CategoricalMap>,
}

impl VariableSpec {
    fn series(name: &str, unit: &str, long_name: &str) -> Self {
        Self {
            name: name.to_string(),
            axes: vec![Axis::Time],
            unit: unit.to_string(),
            long_name: long_name.to_string(),
            bounds: None,
            selector: None,
        }
    }

    fn spectrum(name: &str, unit: &str, long_name: &str) -> Self {
        Self {
            axes: vec![Axis::Wavelength, Axis::Time],
            ..Self::series(name, unit, long_name)
        }
    }

    fn selector(name: &str, long_name: &str, map: CategoricalMap) -> Self {
        Self {
            unit: map.describe(),
            selector: Some(map),
            ..Self::series(name, "", long_name)
        }
    }

    pub fn is_selector(&self) -> bool {
        self.selector.is_some()
    }

    pub fn rank(&self) -> usize {
        self.axes.len()
    }

    /// Schema entry for the QA flag companion of this variable
    pub fn qa_companion(&self) -> VariableSpec {
        let name = format!("{}{}", self.name, QA_SUFFIX);
        VariableSpec {
            long_name: name.clone(),
            name,
            axes: self.axes.clone(),
            unit: QA_UNIT.to_string(),
            bounds: None,
            selector: None,
        }
    }
}

/// Static description of one export family
#[derive(Debug, Clone, PartialEq)]
pub struct FamilySchema {
    pub family: RecordFamily,
    pub version: u32,
    /// Source columns in the order the instrument writes them
    pub columns: &'static [&'static str],
    pub axes: Vec<Axis>,
    pub variables: Vec<VariableSpec>,
    pub global_attributes: Vec<(&'static str, &'static str)>,
    /// Family fragment of the output file name
    pub file_tag: &'static str,
}

impl FamilySchema {
    pub fn for_family(family: RecordFamily) -> Self {
        match family {
            RecordFamily::WaterQuality => Self::water_quality(),
            RecordFamily::Spectral => Self::spectral(),
        }
    }

    pub fn water_quality() -> Self {
        Self {
            family: RecordFamily::WaterQuality,
            version: 1,
            columns: &["station", "time", "id", "tsm", "chla", "kd"],
            axes: vec![Axis::Time],
            variables: vec![
                VariableSpec::series("tsm", "g m-3", "Total Suspended Matter"),
                VariableSpec::series("chla", "mg m-3", "Chlorophyll A"),
                VariableSpec::series(
                    "kd",
                    "m-1",
                    "Diffuse Attenuation Coefficient of Downwelling Irradiance",
                ),
            ],
            global_attributes: vec![
                ("institution", "EAWAG"),
                ("source", "Lexplore Water Quality Data"),
                ("history", "See history on Renku"),
                ("conventions", "CF 1.7"),
                (
                    "comment",
                    "Water quality parameters derived from the spectral recorder on the Lexplore platform in Lake Geneva",
                ),
                ("title", "Lexplore Water Quality Data"),
            ],
            file_tag: "WaterQuality",
        }
    }

    pub fn spectral() -> Self {
        Self {
            family: RecordFamily::Spectral,
            version: 1,
            columns: &[
                "id", "time", "station", "downirr", "downrad", "uprad", "rsr", "ld", "lu", "ed",
            ],
            axes: vec![Axis::Time, Axis::Wavelength],
            variables: vec![
                VariableSpec::spectrum("downirr", "W/(m2*nm)", "Downwelling irradiance"),
                VariableSpec::spectrum("downrad", "W/(m2*nm*sr)", "Downwelling radiance"),
                VariableSpec::spectrum("uprad", "W/(m2*nm*sr)", "Upwelling radiance"),
                VariableSpec::spectrum("rsr", "1/sr", "Remote sensing reflectance"),
                VariableSpec::selector("ld", "Ld selected sensor", CategoricalMap::new("LdS", "LdP")),
                VariableSpec::selector("lu", "Lu selected sensor", CategoricalMap::new("LuS", "LuP")),
                VariableSpec::selector("ed", "Ed selected sensor", CategoricalMap::new("EdF", "EdA")),
            ],
            global_attributes: vec![
                ("institution", "EAWAG"),
                ("source", "Lexplore Spectral Data"),
                ("history", "See history on Renku"),
                ("conventions", "CF 1.7"),
                ("comment", "Data from spectral recorder on  Lexplore"),
                ("title", "Lexplore Spectral Data"),
            ],
            // Historical spelling kept for downstream consumers of the archive
            file_tag: "Sprectral",
        }
    }

    pub fn variable(&self, name: &str) -> Option<&VariableSpec> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn has_axis(&self, axis: Axis) -> bool {
        self.axes.contains(&axis)
    }

    /// Variables that receive a QA flag companion
    pub fn qa_eligible(&self) -> impl Iterator<Item = &VariableSpec> {
        self.variables.iter().filter(|v| !v.is_selector())
    }

    /// Copy of this schema with QA bounds configured for one variable
    pub fn with_bounds(mut self, name: &str, bounds: Bounds) -> Result<Self> {
        let family = self.family;
        let spec = self
            .variables
            .iter_mut()
            .find(|v| v.name == name)
            .ok_or_else(|| WispError::Configuration {
                message: format!("No variable '{}' in {} schema", name, family),
            })?;

        if spec.is_selector() {
            return Err(WispError::Configuration {
                message: format!("Selector variable '{}' does not take QA bounds", name),
            });
        }

        spec.bounds = Some(bounds);
        Ok(self)
    }

    /// Ensure a file provides exactly the columns this schema expects
    pub fn validate_columns(&self, found: usize, path: &Path) -> Result<()> {
        if found != self.columns.len() {
            return Err(WispError::SchemaMismatch {
                family: self.family.to_string(),
                path: path.to_path_buf(),
                expected: self.columns.len(),
                found,
            });
        }
        Ok(())
    }

    /// Position of a named column in the source layout
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| *c == name)
    }
}
