//! Command-line interface components.

use crate::config::ProcessorConfig;
use crate::constants::DEFAULT_LEVEL;
use crate::error::{Result, WispError};
use crate::schema::Bounds;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Convert Lexplore WISPstation exports into quality-flagged NetCDF files
#[derive(Debug, Clone, Parser)]
#[command(
    name = "wisp_processor",
    version,
    about = "Convert Lexplore WISPstation text exports to quality-flagged NetCDF",
    long_about = "Parses the tab-separated WaterQuality and Spectral exports of the Lexplore \
                  WISPstation, attaches a QA flag array to every measured variable and writes one \
                  NetCDF file per export under Level1 of the data directory."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Process exports into NetCDF (rescans Level0 when no files are given)
    Process(ProcessArgs),
    /// List the exports that would be processed
    Discover(DiscoverArgs),
}

#[derive(Debug, Clone, Parser)]
pub struct ProcessArgs {
    /// Export files to process; Spectral files must live under a `Spectral` directory
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Root holding the Level0 and Level1 trees
    #[arg(short = 'd', long = "data-dir", value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// Processing level tag used in output names
    #[arg(short = 'l', long = "level", default_value = DEFAULT_LEVEL)]
    pub level: String,

    /// QA bounds as `variable=min:max`; either side may be empty
    #[arg(short = 'b', long = "bounds", value_name = "VAR=MIN:MAX")]
    pub bounds: Vec<String>,

    /// Increase logging verbosity (-v: debug, -vv: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only show warnings and errors
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    pub quiet: bool,

    /// Also write log output to this file
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Parser)]
pub struct DiscoverArgs {
    /// Root holding the Level0 and Level1 trees
    #[arg(short = 'd', long = "data-dir", value_name = "PATH")]
    pub data_dir: Option<PathBuf>,
}

impl ProcessArgs {
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Build the processing configuration from the arguments
    pub fn to_config(&self) -> Result<ProcessorConfig> {
        let mut config = ProcessorConfig::default()
            .with_level(self.level.clone())
            .with_input_paths(self.files.clone());

        if let Some(data_dir) = &self.data_dir {
            config = config.with_data_dir(data_dir);
        }
        if self.quiet {
            config = config.with_quiet();
        }
        for spec in &self.bounds {
            let (name, bounds) = parse_bounds_arg(spec)?;
            config = config.with_bounds(name, bounds);
        }

        config.validate()?;
        Ok(config)
    }
}

impl DiscoverArgs {
    pub fn to_config(&self) -> ProcessorConfig {
        match &self.data_dir {
            Some(data_dir) => ProcessorConfig::default().with_data_dir(data_dir),
            None => ProcessorConfig::default(),
        }
    }
}

/// Parse `variable=min:max`
pub fn parse_bounds_arg(spec: &str) -> Result<(String, Bounds)> {
    let invalid = || WispError::Configuration {
        message: format!("Invalid bounds '{}', expected VAR=MIN:MAX", spec),
    };

    let (name, range) = spec.split_once('=').ok_or_else(invalid)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(invalid());
    }
    let bounds = Bounds::parse(range).ok_or_else(invalid)?;
    Ok((name.to_string(), bounds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bounds_arg() {
        assert_eq!(
            parse_bounds_arg("tsm=0:100").unwrap(),
            ("tsm".to_string(), Bounds::new(Some(0.0), Some(100.0)))
        );
        assert_eq!(
            parse_bounds_arg("rsr=0:").unwrap(),
            ("rsr".to_string(), Bounds::new(Some(0.0), None))
        );
        assert!(parse_bounds_arg("tsm").is_err());
        assert!(parse_bounds_arg("=0:1").is_err());
        assert!(parse_bounds_arg("tsm=a:b").is_err());
    }

    #[test]
    fn test_process_args_to_config() {
        let args = Args::parse_from([
            "wisp_processor",
            "process",
            "--data-dir",
            "/srv/wisp",
            "--level",
            "L2",
            "--bounds",
            "chla=0:200",
            "-q",
            "a.txt",
        ]);
        let Commands::Process(process) = args.command else {
            panic!("Expected process command");
        };

        assert_eq!(process.get_log_level(), "warn");
        let config = process.to_config().unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/wisp"));
        assert_eq!(config.level, "L2");
        assert_eq!(config.input_paths, vec![PathBuf::from("a.txt")]);
        assert!(config.quiet);
        assert_eq!(
            config.bounds.get("chla"),
            Some(&Bounds::new(Some(0.0), Some(200.0)))
        );
    }

    #[test]
    fn test_unknown_bounds_variable_is_rejected() {
        let args = Args::parse_from(["wisp_processor", "process", "-b", "turbidity=0:1"]);
        let Commands::Process(process) = args.command else {
            panic!("Expected process command");
        };
        assert!(process.to_config().is_err());
    }

    #[test]
    fn test_verbosity() {
        let args = Args::parse_from(["wisp_processor", "process", "-vv"]);
        let Commands::Process(process) = args.command else {
            panic!("Expected process command");
        };
        assert_eq!(process.get_log_level(), "trace");
    }
}
