//! NetCDF serializer.
//!
//! Writes one self-describing NetCDF-4 file per dataset: global attributes
//! from the family schema, the `time` (unlimited) and `wavelength`
//! dimensions, their coordinate variables, the measured and selector
//! variables and finally the QA flag variables. All variables are stored as
//! 64-bit floats with `units` and `long_name` attributes.
//!
//! Files are staged under a temporary name in the output directory and only
//! moved over the final name once fully written, so a failed write never
//! leaves a partial file behind.

use crate::constants::{FILENAME_TIME_FORMAT, OUTPUT_EXTENSION, SITE_NAME};
use crate::error::{Result, WispError};
use crate::models::{Dataset, QaResult};
use crate::schema::{Axis, FamilySchema};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Output file name: `<level>_Lexplore_<tag>_<YYYYMMDD_HHMMSS>.nc`
pub fn output_filename(dataset: &Dataset, schema: &FamilySchema, level: &str) -> Result<String> {
    let first = dataset
        .first_timestamp()
        .ok_or_else(|| WispError::ProcessingFailed {
            path: dataset.source.clone(),
            reason: "Dataset has no valid first timestamp".to_string(),
        })?;

    Ok(format!(
        "{}_{}_{}_{}.{}",
        level,
        SITE_NAME,
        schema.file_tag,
        first.format(FILENAME_TIME_FORMAT),
        OUTPUT_EXTENSION
    ))
}

/// Serialize a dataset and its QA flags into `output_dir`, replacing any
/// previous file of the same name. Returns the written path.
pub fn write_netcdf(
    dataset: &Dataset,
    qa: &QaResult,
    schema: &FamilySchema,
    output_dir: &Path,
    level: &str,
) -> Result<PathBuf> {
    let target = output_dir.join(output_filename(dataset, schema, level)?);

    let staging = tempfile::Builder::new()
        .prefix(".wisp-")
        .suffix(".nc.partial")
        .tempfile_in(output_dir)?;

    write_contents(staging.path(), dataset, qa, schema)?;

    if target.exists() {
        debug!("Replacing existing output {}", target.display());
        fs::remove_file(&target)?;
    }
    staging.persist(&target).map_err(|e| e.error)?;

    info!(
        "Wrote {} ({} rows, {} QA variables)",
        target.display(),
        dataset.len(),
        qa.derived.len()
    );
    Ok(target)
}

fn write_contents(path: &Path, dataset: &Dataset, qa: &QaResult, schema: &FamilySchema) -> Result<()> {
    let mut file = netcdf::create(path)?;

    for (key, value) in &schema.global_attributes {
        file.add_attribute(key, *value)?;
    }

    for axis in &schema.axes {
        match axis {
            Axis::Time => {
                file.add_unlimited_dimension(axis.name())?;
            }
            Axis::Wavelength => {
                let count = dataset.wavelength.as_ref().map_or(0, Vec::len);
                file.add_dimension(axis.name(), count)?;
            }
        }
    }

    let n = dataset.len();
    let time: Vec<f64> = dataset.time.iter().map(|t| *t as f64).collect();
    put_variable(&mut file, Axis::Time.name(), &[Axis::Time], Axis::Time.unit(), Axis::Time.long_name(), &time, &[n])?;

    if schema.has_axis(Axis::Wavelength) {
        let wavelength: Vec<f64> = dataset
            .wavelength
            .as_ref()
            .ok_or_else(|| WispError::ProcessingFailed {
                path: dataset.source.clone(),
                reason: "Spectral dataset has no wavelength axis".to_string(),
            })?
            .iter()
            .map(|w| f64::from(*w))
            .collect();
        let m = wavelength.len();
        put_variable(
            &mut file,
            Axis::Wavelength.name(),
            &[Axis::Wavelength],
            Axis::Wavelength.unit(),
            Axis::Wavelength.long_name(),
            &wavelength,
            &[m],
        )?;
    }

    for spec in &schema.variables {
        let variable = dataset
            .variable(&spec.name)
            .ok_or_else(|| WispError::ProcessingFailed {
                path: dataset.source.clone(),
                reason: format!("Variable '{}' missing from dataset", spec.name),
            })?;
        put_variable(
            &mut file,
            &spec.name,
            &spec.axes,
            &spec.unit,
            &spec.long_name,
            &variable.values(),
            &variable.shape,
        )?;
    }

    for derived in &qa.derived {
        put_variable(
            &mut file,
            &derived.spec.name,
            &derived.spec.axes,
            &derived.spec.unit,
            &derived.spec.long_name,
            &derived.flags.values(),
            &derived.flags.shape,
        )?;
    }

    debug!("Finished writing {}", path.display());
    Ok(())
}

fn put_variable(
    file: &mut netcdf::FileMut,
    name: &str,
    axes: &[Axis],
    unit: &str,
    long_name: &str,
    values: &[f64],
    shape: &[usize],
) -> Result<()> {
    let dims: Vec<&str> = axes.iter().map(Axis::name).collect();
    let mut var = file.add_variable::<f64>(name, &dims)?;
    var.put_attribute("units", unit)?;
    var.put_attribute("long_name", long_name)?;

    match shape {
        [n] => var.put_values(values, (0..*n,))?,
        [m, n] => var.put_values(values, (0..*m, 0..*n))?,
        _ => {
            return Err(WispError::Configuration {
                message: format!("Unsupported rank {} for variable '{}'", shape.len(), name),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RecordFamily, Sample, Variable};
    use crate::quality::assess;
    use tempfile::TempDir;

    fn dataset(first: i64) -> Dataset {
        Dataset {
            family: RecordFamily::WaterQuality,
            source: PathBuf::from("wq.txt"),
            time: vec![first, first + 900],
            wavelength: None,
            variables: ["tsm", "chla", "kd"]
                .iter()
                .map(|name| {
                    Variable::new(*name, vec![2], vec![Sample::Number(1.0), Sample::Missing])
                })
                .collect(),
        }
    }

    #[test]
    fn test_output_filename() {
        let ds = dataset(1_622_541_600);
        assert_eq!(
            output_filename(&ds, &FamilySchema::water_quality(), "L1").unwrap(),
            "L1_Lexplore_WaterQuality_20210601_100000.nc"
        );
        assert_eq!(
            output_filename(&ds, &FamilySchema::spectral(), "L1").unwrap(),
            "L1_Lexplore_Sprectral_20210601_100000.nc"
        );
    }

    #[test]
    fn test_empty_dataset_has_no_filename() {
        let mut ds = dataset(0);
        ds.time.clear();
        assert!(output_filename(&ds, &FamilySchema::water_quality(), "L1").is_err());
    }

    #[test]
    fn test_rewrite_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let schema = FamilySchema::water_quality();
        let ds = dataset(1_622_541_600);
        let qa = assess(&ds, &schema);

        let first = write_netcdf(&ds, &qa, &schema, dir.path(), "L1").unwrap();
        let second = write_netcdf(&ds, &qa, &schema, dir.path(), "L1").unwrap();
        assert_eq!(first, second);

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0], "L1_Lexplore_WaterQuality_20210601_100000.nc");
    }

    #[test]
    fn test_failed_write_leaves_nothing_behind() {
        let dir = TempDir::new().unwrap();
        let schema = FamilySchema::water_quality();
        let mut ds = dataset(1_622_541_600);
        // Drop a variable the schema requires
        ds.variables.pop();
        let qa = assess(&ds, &schema);

        assert!(write_netcdf(&ds, &qa, &schema, dir.path(), "L1").is_err());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
