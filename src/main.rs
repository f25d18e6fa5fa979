use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::fs::File;
use std::path::Path;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};
use wisp_processor::cli::{Args, Commands, DiscoverArgs, ProcessArgs};
use wisp_processor::processor::Processor;

fn main() {
    let args = Args::parse();

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        match args.command {
            Commands::Process(process_args) => run_process(process_args).await,
            Commands::Discover(discover_args) => run_discover(discover_args),
        }
    });

    if let Err(error) = result {
        eprintln!("Error: {:#}", error);
        process::exit(1);
    }
}

async fn run_process(args: ProcessArgs) -> Result<()> {
    setup_logging(args.get_log_level(), args.log_file.as_deref())?;

    let config = args.to_config().context("Invalid processing options")?;
    let cancelled = Arc::new(AtomicBool::new(false));
    let processor = Processor::new(config)
        .context("Failed to initialise processor")?
        .with_cancellation(Arc::clone(&cancelled));

    let signal_flag = Arc::clone(&cancelled);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nReceived CTRL+C, finishing current file...");
            signal_flag.store(true, Ordering::SeqCst);
        }
    });

    let report = tokio::task::spawn_blocking(move || processor.run())
        .await
        .context("Processing task panicked")?
        .context("Processing failed")?;

    if cancelled.load(Ordering::SeqCst) {
        warn!("Run interrupted by user");
    }
    debug!("Touched files: {:?}", report.touched_files());
    Ok(())
}

fn run_discover(args: DiscoverArgs) -> Result<()> {
    let processor = Processor::new(args.to_config()).context("Failed to initialise processor")?;
    let inputs = processor
        .discover_inputs()
        .context("Failed to scan raw data directories")?;

    println!(
        "{} {} exports under {}",
        "Found".bright_green(),
        inputs.len().to_string().bright_white().bold(),
        processor.config().data_dir.display()
    );
    for path in inputs {
        println!("  {}", path.display());
    }
    Ok(())
}

/// Set up structured logging, optionally mirrored to a file
fn setup_logging(log_level: &str, log_file: Option<&Path>) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("wisp_processor={}", log_level)));

    let file_layer = match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}
