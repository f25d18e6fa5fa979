//! Test fixtures for WISP export parsing
//!
//! Builders for water-quality and spectral exports laid out the way the
//! instrument writes them: a line-count line, metadata lines, a header row
//! and tab-separated data rows.

use std::io::Write;
use tempfile::NamedTempFile;


/// Metadata lines written after the line-count line
pub const METADATA: &[&str] = &[
    "instrument\tWISPstation017",
    "service\tData",
    "request\tGetData",
];

/// Write an export with the given header row and data rows
pub fn write_export(header: &str, rows: &[String]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{} lines of metadata", METADATA.len()).unwrap();
    for line in METADATA {
        writeln!(file, "{}", line).unwrap();
    }
    writeln!(file, "{}", header).unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
    file.flush().unwrap();
    file
}

pub fn water_quality_row(time: &str, tsm: &str, chla: &str, kd: &str) -> String {
    format!("WISPstation017\t{}\t1001\t{}\t{}\t{}", time, tsm, chla, kd)
}

pub fn water_quality_header() -> &'static str {
    "instrument.name\tmeasurement.date\tmeasurement.id\tlevel2.tsm\tlevel2.chla\tlevel2.kd"
}

/// Spectrum cell with `len` values starting at `start`, increasing by `step`
pub fn spectrum_cell(len: usize, start: f64, step: f64) -> String {
    let values: Vec<String> = (0..len)
        .map(|i| format!("{}", start + step * i as f64))
        .collect();
    format!("[{}]", values.join(", "))
}

pub fn spectral_row(time: &str, spectrum: &str, ld: &str, lu: &str, ed: &str) -> String {
    format!(
        "7001\t{}\tWISPstation017\t{s}\t{s}\t{s}\t{s}\t{}\t{}\t{}",
        time,
        ld,
        lu,
        ed,
        s = spectrum
    )
}

pub fn spectral_header() -> &'static str {
    "measurement.id\tmeasurement.date\tinstrument.name\ted.irradiance\tld.radiance\tlu.radiance\tlevel2.reflectance\tld.selected\tlu.selected\ted.selected"
}
