//! Core data structures and types for WISP processing.
//!
//! Defines record families, parsed datasets, QA results and batch
//! statistics used throughout the library.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

use crate::schema::VariableSpec;

/// Record families exported by the WISPstation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordFamily {
    WaterQuality,
    Spectral,
}

impl RecordFamily {
    pub const ALL: [RecordFamily; 2] = [RecordFamily::Spectral, RecordFamily::WaterQuality];

    /// Detect the family from the storage layout: any path component named
    /// `Spectral` selects the spectral pipeline, everything else is water quality.
    pub fn from_path(path: &Path) -> Self {
        let spectral = path
            .parent()
            .into_iter()
            .flat_map(Path::components)
            .any(|c| matches!(c, Component::Normal(name) if name == "Spectral"));

        if spectral {
            RecordFamily::Spectral
        } else {
            RecordFamily::WaterQuality
        }
    }

    /// Directory name used under the Level0/Level1 trees
    pub fn dir_name(&self) -> &'static str {
        match self {
            RecordFamily::WaterQuality => "WaterQuality",
            RecordFamily::Spectral => "Spectral",
        }
    }
}

impl std::fmt::Display for RecordFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// A single data point as read from the source file
#[derive(Debug, Clone, PartialEq)]
pub enum Sample {
    Number(f64),
    /// The `None` token or an empty cell
    Missing,
    /// Text that could not be coerced to a number
    Invalid(String),
}

impl Sample {
    /// Numeric value, NaN for anything that is not a number
    pub fn as_f64(&self) -> f64 {
        match self {
            Sample::Number(v) => *v,
            Sample::Missing | Sample::Invalid(_) => f64::NAN,
        }
    }

    /// Whether the sample passes the numeric probe. A missing value is a NaN
    /// sentinel, which is still a float.
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Sample::Invalid(_))
    }
}

/// A named array stored row-major with its shape
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub shape: Vec<usize>,
    pub samples: Vec<Sample>,
}

impl Variable {
    pub fn new(name: impl Into<String>, shape: Vec<usize>, samples: Vec<Sample>) -> Self {
        debug_assert_eq!(shape.iter().product::<usize>(), samples.len());
        Self {
            name: name.into(),
            shape,
            samples,
        }
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Element at `index` in shape order
    pub fn get(&self, index: &[usize]) -> Option<&Sample> {
        if index.len() != self.shape.len() {
            return None;
        }
        let mut flat = 0;
        for (i, dim) in index.iter().zip(&self.shape) {
            if i >= dim {
                return None;
            }
            flat = flat * dim + i;
        }
        self.samples.get(flat)
    }

    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(Sample::as_f64).collect()
    }
}

/// In-memory result of parsing one source file
#[derive(Debug, Clone)]
pub struct Dataset {
    pub family: RecordFamily,
    pub source: PathBuf,
    /// Seconds since 1970-01-01 UTC, one per row
    pub time: Vec<i64>,
    pub wavelength: Option<Vec<i32>>,
    pub variables: Vec<Variable>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.time
            .first()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(*secs, 0))
    }
}

/// Outcome of parsing a source file
#[derive(Debug, Clone)]
pub enum ParseOutcome {
    Data(Dataset),
    /// The export exists but carries no measurements
    NoData,
}

/// A QA flag array together with the schema entry registered for it
#[derive(Debug, Clone)]
pub struct DerivedVariable {
    pub spec: VariableSpec,
    pub flags: Variable,
}

/// Flag variables produced by the QA engine for one dataset
#[derive(Debug, Clone, Default)]
pub struct QaResult {
    pub derived: Vec<DerivedVariable>,
}

impl QaResult {
    pub fn get(&self, name: &str) -> Option<&DerivedVariable> {
        self.derived.iter().find(|d| d.spec.name == name)
    }

    /// Number of data points flagged for investigation
    pub fn flagged_count(&self) -> usize {
        self.derived
            .iter()
            .flat_map(|d| d.flags.samples.iter())
            .filter(|s| matches!(s, Sample::Number(v) if *v == 1.0))
            .count()
    }
}

/// Processing statistics for one batch
#[derive(Debug, Default, Clone)]
pub struct ProcessingStats {
    pub files_processed: usize,
    pub files_without_data: usize,
    pub files_failed: usize,
    pub files_skipped: usize,
    pub processing_time_ms: u128,
}

/// Result of a batch run: produced outputs plus the inputs that were fed in
#[derive(Debug, Default, Clone)]
pub struct BatchReport {
    pub outputs: Vec<PathBuf>,
    pub inputs: Vec<PathBuf>,
    pub stats: ProcessingStats,
}

impl BatchReport {
    /// Outputs followed by inputs, the list handed to downstream publishing
    pub fn touched_files(&self) -> Vec<PathBuf> {
        self.outputs
            .iter()
            .chain(self.inputs.iter())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_from_path() {
        assert_eq!(
            RecordFamily::from_path(Path::new(
                "data/Level0/Spectral/Lexplore_Spectral_2021-06-01.txt"
            )),
            RecordFamily::Spectral
        );
        assert_eq!(
            RecordFamily::from_path(Path::new(
                "data/Level0/WaterQuality/Lexplore_Water_Quality_2021-06-01.txt"
            )),
            RecordFamily::WaterQuality
        );
        // File name alone does not select the spectral pipeline
        assert_eq!(
            RecordFamily::from_path(Path::new("Lexplore_Spectral_2021-06-01.txt")),
            RecordFamily::WaterQuality
        );
    }

    #[test]
    fn test_sample_numeric_probe() {
        assert!(Sample::Number(1.5).is_numeric());
        assert!(Sample::Missing.is_numeric());
        assert!(!Sample::Invalid("abc".to_string()).is_numeric());
        assert!(Sample::Missing.as_f64().is_nan());
        assert!(Sample::Invalid("abc".to_string()).as_f64().is_nan());
    }

    #[test]
    fn test_variable_indexing() {
        let samples = (0..6).map(|v| Sample::Number(v as f64)).collect();
        let var = Variable::new("x", vec![2, 3], samples);

        assert_eq!(var.rank(), 2);
        assert_eq!(var.get(&[0, 0]), Some(&Sample::Number(0.0)));
        assert_eq!(var.get(&[1, 2]), Some(&Sample::Number(5.0)));
        assert_eq!(var.get(&[2, 0]), None);
        assert_eq!(var.get(&[0]), None);
    }

    #[test]
    fn test_first_timestamp() {
        let dataset = Dataset {
            family: RecordFamily::WaterQuality,
            source: PathBuf::from("x.txt"),
            time: vec![1_622_541_600, 1_622_545_200],
            wavelength: None,
            variables: vec![],
        };
        let ts = dataset.first_timestamp().unwrap();
        assert_eq!(ts.format("%Y%m%d_%H%M%S").to_string(), "20210601_100000");
        assert_eq!(dataset.len(), 2);
    }
}
