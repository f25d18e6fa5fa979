//! Batch processing of WISP exports.
//!
//! Orchestrates the per-file workflow: storage layout setup, input
//! discovery, family dispatch, parsing, quality assurance and NetCDF
//! output. Files are handled strictly one after another and a failure in
//! one file is logged and counted without stopping the batch.

use crate::config::ProcessorConfig;
use crate::error::{Result, WispError};
use crate::models::{BatchReport, ParseOutcome, ProcessingStats, RecordFamily};
use crate::parser::parse_file;
use crate::quality::assess;
use crate::schema::FamilySchema;
use crate::writer::write_netcdf;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Main processor for WISP export conversion
pub struct Processor {
    config: ProcessorConfig,
    schemas: HashMap<RecordFamily, FamilySchema>,
    cancelled: Arc<AtomicBool>,
}

impl Processor {
    /// Create a processor; schemas are resolved once from the configuration
    pub fn new(config: ProcessorConfig) -> Result<Self> {
        config.validate()?;

        let schemas = RecordFamily::ALL
            .iter()
            .map(|family| Ok((*family, config.schema_for(*family)?)))
            .collect::<Result<HashMap<_, _>>>()?;

        Ok(Self {
            config,
            schemas,
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Share a cancellation flag checked between files
    pub fn with_cancellation(mut self, cancelled: Arc<AtomicBool>) -> Self {
        self.cancelled = cancelled;
        self
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    fn schema(&self, family: RecordFamily) -> Result<&FamilySchema> {
        self.schemas
            .get(&family)
            .ok_or_else(|| WispError::Configuration {
                message: format!("No schema registered for {}", family),
            })
    }

    /// Create the Level0/Level1 trees for both families
    pub fn prepare_directories(&self) -> Result<()> {
        for family in RecordFamily::ALL {
            for dir in [self.config.raw_dir(family), self.config.output_dir(family)] {
                fs::create_dir_all(&dir)?;
                debug!("Ensured directory {}", dir.display());
            }
        }
        Ok(())
    }

    /// Every raw export currently stored under Level0, sorted
    pub fn discover_inputs(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for family in RecordFamily::ALL {
            let raw_dir = self.config.raw_dir(family);
            let pattern = format!(
                "{}/*",
                glob::Pattern::escape(&raw_dir.to_string_lossy())
            );
            debug!("Searching for exports with pattern: {}", pattern);

            let entries = glob::glob(&pattern).map_err(|e| WispError::Configuration {
                message: format!("Invalid search pattern '{}': {}", pattern, e),
            })?;

            for entry in entries {
                match entry {
                    Ok(path) if path.is_file() => files.push(path),
                    Ok(_) => {}
                    Err(e) => warn!("Skipping unreadable entry: {}", e),
                }
            }
        }

        files.sort();
        debug!("Discovered {} exports", files.len());
        Ok(files)
    }

    /// Inputs from the configuration, or a rescan of Level0
    pub fn resolve_inputs(&self) -> Result<Vec<PathBuf>> {
        if self.config.input_paths.is_empty() {
            info!(
                "Reprocessing complete dataset from {}",
                self.config.data_dir.display()
            );
            self.discover_inputs()
        } else {
            Ok(self.config.input_paths.clone())
        }
    }

    /// Parse, quality-check and serialize one export.
    ///
    /// Returns `Ok(None)` for exports without data.
    pub fn process_file(&self, path: &Path) -> Result<Option<PathBuf>> {
        let family = RecordFamily::from_path(path);
        let schema = self.schema(family)?;

        let dataset = match parse_file(path, schema)? {
            ParseOutcome::Data(dataset) => dataset,
            ParseOutcome::NoData => return Ok(None),
        };

        let qa = assess(&dataset, schema);

        let output_dir = self.config.output_dir(family);
        fs::create_dir_all(&output_dir)?;
        let output = write_netcdf(&dataset, &qa, schema, &output_dir, &self.config.level)?;

        Ok(Some(output))
    }

    /// Process a batch sequentially, isolating per-file failures
    pub fn process_all(&self, inputs: Vec<PathBuf>) -> BatchReport {
        let start_time = Instant::now();
        let mut stats = ProcessingStats::default();
        let mut outputs = Vec::new();

        let pb = self.progress_bar(inputs.len());

        for (index, path) in inputs.iter().enumerate() {
            if self.cancelled.load(Ordering::SeqCst) {
                stats.files_skipped = inputs.len() - index;
                warn!("Processing cancelled, {} files skipped", stats.files_skipped);
                break;
            }

            if let Some(file_name) = path.file_name() {
                pb.set_message(format!("Processing: {}", file_name.to_string_lossy()));
            }

            match self.process_file(path) {
                Ok(Some(output)) => {
                    stats.files_processed += 1;
                    outputs.push(output);
                }
                Ok(None) => {
                    stats.files_without_data += 1;
                }
                Err(e) => {
                    stats.files_failed += 1;
                    error!("Failed for {}: {:#}", path.display(), e);
                }
            }
            pb.inc(1);
        }

        pb.finish_with_message("All exports processed");
        stats.processing_time_ms = start_time.elapsed().as_millis();

        BatchReport {
            outputs,
            inputs,
            stats,
        }
    }

    /// Full run: directories, inputs, processing and summary
    pub fn run(&self) -> Result<BatchReport> {
        self.prepare_directories()?;

        let inputs = self.resolve_inputs()?;
        if !self.config.quiet {
            println!(
                "  {} {} exports",
                "Found".bright_green(),
                inputs.len().to_string().bright_white().bold()
            );
        }

        let report = self.process_all(inputs);

        if !self.config.quiet {
            print_summary(&report);
        }
        Ok(report)
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if self.config.quiet {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        pb.set_style(style);
        pb
    }
}

/// Print the coloured batch summary
pub fn print_summary(report: &BatchReport) {
    let stats = &report.stats;

    println!("\n{}", "Processing Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        stats.processing_time_ms.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Files written:".bright_cyan(),
        stats.files_processed.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Files without data:".bright_cyan(),
        stats.files_without_data.to_string().bright_white()
    );
    if stats.files_failed > 0 {
        println!(
            "  {} {}",
            "Files failed:".bright_red(),
            stats.files_failed.to_string().bright_red().bold()
        );
    }
    if stats.files_skipped > 0 {
        println!(
            "  {} {}",
            "Files skipped:".bright_yellow(),
            stats.files_skipped.to_string().bright_yellow()
        );
    }
}
