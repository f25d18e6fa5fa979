//! Quality-assurance engine.
//!
//! Produces a `<name>_qual` flag array for every measured variable of a
//! dataset. A data point is flagged `1` ("more investigation") when it fails
//! the numeric probe or falls outside the variable's configured bounds, and
//! `0` ("nothing to report") otherwise. Selector variables carry fixed codes
//! rather than measurements and get no flags.
//!
//! The engine reads the dataset and the static schema and returns the flag
//! variables together with their derived schema entries; neither input is
//! modified.

use crate::models::{Dataset, DerivedVariable, QaResult, Sample, Variable};
use crate::schema::{Bounds, FamilySchema};
use tracing::{debug, warn};

pub const FLAG_OK: f64 = 0.0;
pub const FLAG_INVESTIGATE: f64 = 1.0;

/// Flag a single data point
pub fn flag_sample(sample: &Sample, bounds: Option<&Bounds>) -> f64 {
    if !sample.is_numeric() {
        return FLAG_INVESTIGATE;
    }

    let value = sample.as_f64();
    let Some(bounds) = bounds else {
        return FLAG_OK;
    };

    let below = bounds.min.is_some_and(|min| value < min);
    let above = bounds.max.is_some_and(|max| value > max);

    if below || above {
        FLAG_INVESTIGATE
    } else {
        FLAG_OK
    }
}

/// Flag every point of a variable, keeping its shape
pub fn flag_variable(variable: &Variable, name: &str, bounds: Option<&Bounds>) -> Variable {
    let samples = variable
        .samples
        .iter()
        .map(|s| Sample::Number(flag_sample(s, bounds)))
        .collect();
    Variable::new(name, variable.shape.clone(), samples)
}

/// Run QA over all eligible variables of a dataset
pub fn assess(dataset: &Dataset, schema: &FamilySchema) -> QaResult {
    let mut derived = Vec::new();

    for spec in schema.qa_eligible() {
        let Some(variable) = dataset.variable(&spec.name) else {
            warn!(
                "Variable '{}' missing from dataset {}, skipping QA",
                spec.name,
                dataset.source.display()
            );
            continue;
        };

        let qa_spec = spec.qa_companion();
        let flags = flag_variable(variable, &qa_spec.name, spec.bounds.as_ref());
        derived.push(DerivedVariable {
            spec: qa_spec,
            flags,
        });
    }

    let result = QaResult { derived };
    debug!(
        "QA for {}: {} flag variables, {} points flagged",
        dataset.source.display(),
        result.derived.len(),
        result.flagged_count()
    );
    result
}
