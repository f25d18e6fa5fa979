//! WISP export header parsing.
//!
//! The first line of every export states how many metadata lines precede
//! the column header row. The digits on that line are concatenated to get
//! the count, and the tabular body starts on the line after the header row.

use crate::error::{Result, WispError};
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

/// Line positions of an export (0-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderLayout {
    pub metadata_lines: usize,
    pub header_row: usize,
    pub body_start: usize,
    pub total_lines: usize,
}

impl HeaderLayout {
    pub fn from_metadata_lines(metadata_lines: usize, total_lines: usize) -> Self {
        Self {
            metadata_lines,
            header_row: metadata_lines + 1,
            body_start: metadata_lines + 2,
            total_lines,
        }
    }

    /// Number of lines at or after the start of the body
    pub fn data_rows(&self) -> usize {
        self.total_lines.saturating_sub(self.body_start)
    }
}

fn digit_runs() -> &'static Regex {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    DIGITS.get_or_init(|| Regex::new(r"[0-9]+").expect("static regex"))
}

/// Metadata line count encoded on the first line, ignoring non-digit text
pub fn metadata_line_count(first_line: &str) -> Option<usize> {
    let digits: String = digit_runs()
        .find_iter(first_line)
        .map(|m| m.as_str())
        .collect();

    if digits.is_empty() {
        return None;
    }
    digits.parse::<usize>().ok()
}

/// Compute the header layout of an export
pub fn parse_header_layout(file_path: &Path) -> Result<HeaderLayout> {
    let file = File::open(file_path)?;
    let reader = BufReader::new(file);

    let mut first_line = None;
    let mut total_lines = 0;

    for line in reader.lines() {
        let line = line?;
        if first_line.is_none() {
            first_line = Some(line);
        }
        total_lines += 1;
    }

    let first_line = first_line.ok_or_else(|| WispError::HeaderParsingFailed {
        path: file_path.to_path_buf(),
        reason: "File is empty".to_string(),
    })?;

    let metadata_lines =
        metadata_line_count(&first_line).ok_or_else(|| WispError::HeaderParsingFailed {
            path: file_path.to_path_buf(),
            reason: format!("No header line count in first line: '{}'", first_line.trim()),
        })?;

    let layout = HeaderLayout::from_metadata_lines(metadata_lines, total_lines);

    debug!(
        "Parsed header for {}: header_row={}, body_start={}, data_rows={}",
        file_path.display(),
        layout.header_row,
        layout.body_start,
        layout.data_rows()
    );

    Ok(layout)
}
