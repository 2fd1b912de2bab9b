use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use echem_converter::cli::{Args, collect_inputs};
use echem_converter::models::ConversionStats;
use echem_converter::output::read_metadata;
use echem_converter::processor::{BatchConverter, print_summary};
use std::process;
use tracing::{debug, info};

fn main() {
    let args = Args::parse();
    setup_logging(&args);

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        tokio::select! {
            result = run(args) => result.map(Some),
            _ = tokio::signal::ctrl_c() => {
                eprintln!("\nReceived CTRL+C, shutting down...");
                Ok(None)
            }
        }
    });

    match result {
        Ok(Some(stats)) if stats.files_failed == 0 => process::exit(0),
        Ok(Some(_)) => process::exit(1),
        Ok(None) => process::exit(130),
        Err(error) => {
            eprintln!("{} {:#}", "Error:".bright_red().bold(), error);
            process::exit(1);
        }
    }
}

/// Set up structured logging on stderr
fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_filter()));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

async fn run(args: Args) -> Result<ConversionStats> {
    let config = args.to_config()?;
    let files = collect_inputs(&args.inputs, &config)?;
    info!("Converting {} files as {}", files.len(), config.device);

    let mut converter = BatchConverter::new(config);
    if let Some(path) = &args.metadata {
        let metadata = read_metadata(path)
            .with_context(|| format!("Failed to read metadata from {}", path.display()))?;
        debug!("Loaded {} metadata keys from {}", metadata.len(), path.display());
        converter = converter.with_metadata(metadata);
    }

    let stats = converter.run(files).await?;
    print_summary(&stats);
    Ok(stats)
}
