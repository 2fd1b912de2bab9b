//! Batch conversion of many files.
//!
//! Every input is converted by an independent pipeline on the blocking
//! thread pool; at most `max_concurrent_files` run at a time. A failing
//! file is logged and counted, the remaining files still convert. Inputs
//! that would write to the same output path all fail before any of them is
//! converted.

use crate::config::ConverterConfig;
use crate::converter::{ConvertedFile, convert_file};
use crate::error::{ConverterError, Result};
use crate::models::{ConversionStats, Metadata};
use crate::output::output_path;

use colored::*;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::task;
use tracing::{debug, error, warn};

/// Converts a set of files with a shared configuration and metadata
pub struct BatchConverter {
    config: Arc<ConverterConfig>,
    metadata: Option<Arc<Metadata>>,
    show_progress: bool,
}

impl BatchConverter {
    pub fn new(config: ConverterConfig) -> Self {
        Self {
            config: Arc::new(config),
            metadata: None,
            show_progress: true,
        }
    }

    /// Metadata attached to every converted file
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(Arc::new(metadata));
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len as u64);
        let style = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb
    }

    /// Convert a single file on the blocking pool
    pub async fn convert_one(&self, path: PathBuf) -> Result<ConvertedFile> {
        let config = Arc::clone(&self.config);
        let metadata = self.metadata.as_deref().cloned();

        task::spawn_blocking({
            let path = path.clone();
            move || convert_file(&path, &config, metadata)
        })
        .await
        .map_err(|e| ConverterError::ProcessingFailed {
            path,
            reason: format!("conversion task failed: {}", e),
        })?
    }

    /// Inputs whose output table is shared with another input, mapped to that table
    pub fn output_collisions(&self, files: &[PathBuf]) -> HashMap<PathBuf, PathBuf> {
        let mut planned: HashMap<PathBuf, Vec<&PathBuf>> = HashMap::new();
        for path in files {
            if let Ok(table) = output_path(
                path,
                self.config.output_format.suffix(),
                self.config.output_dir.as_deref(),
            ) {
                planned.entry(table).or_default().push(path);
            }
        }

        planned
            .into_iter()
            .filter(|(_, inputs)| inputs.len() > 1)
            .flat_map(|(table, inputs)| {
                warn!(
                    "{} inputs would all be written to {}",
                    inputs.len(),
                    table.display()
                );
                inputs
                    .into_iter()
                    .map(move |input| (input.clone(), table.clone()))
            })
            .collect()
    }

    /// Convert all `files`, collecting statistics
    pub async fn run(&self, files: Vec<PathBuf>) -> Result<ConversionStats> {
        let start_time = Instant::now();
        if files.is_empty() {
            return Ok(ConversionStats::default());
        }

        let concurrent_limit = self.config.max_concurrent_files.min(files.len()).max(1);
        debug!(
            "Converting {} files as {}, {} at a time",
            files.len(),
            self.config.device,
            concurrent_limit
        );

        let collisions = self.output_collisions(&files);
        let collisions = &collisions;

        let pb = self.progress_bar(files.len());
        pb.set_message("Converting files");

        let mut stats = stream::iter(files)
            .map(|path| {
                let pb = pb.clone();
                async move {
                    if let Some(file_name) = path.file_name() {
                        pb.set_message(format!("Converting: {}", file_name.to_string_lossy()));
                    }

                    let result = match collisions.get(&path) {
                        Some(table) => Err(ConverterError::ProcessingFailed {
                            path: path.clone(),
                            reason: format!(
                                "output {} is shared with another input",
                                table.display()
                            ),
                        }),
                        None => self.convert_one(path.clone()).await,
                    };
                    pb.inc(1);

                    if let Err(e) = &result {
                        error!("Failed to convert {}: {}", path.display(), e);
                    }
                    result
                }
            })
            .buffer_unordered(concurrent_limit)
            .fold(ConversionStats::default(), |mut stats, result| async move {
                match result {
                    Ok(converted) => {
                        stats.files_converted += 1;
                        stats.total_rows += converted.rows;
                        stats.outputs.extend(converted.outputs());
                    }
                    Err(_) => stats.files_failed += 1,
                }
                stats
            })
            .await;

        pb.finish_with_message("All files processed");

        stats.outputs.sort();
        stats.processing_time_ms = start_time.elapsed().as_millis();
        Ok(stats)
    }
}

/// Print the colored end-of-run summary
pub fn print_summary(stats: &ConversionStats) {
    println!("\n{}", "Conversion Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        stats.processing_time_ms.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Files converted:".bright_cyan(),
        stats.files_converted.to_string().bright_white()
    );
    if stats.files_failed > 0 {
        println!(
            "  {} {}",
            "Files failed:".bright_red(),
            stats.files_failed.to_string().bright_red().bold()
        );
    }
    println!(
        "  {} {}",
        "Total rows:".bright_cyan(),
        stats.total_rows.to_string().bright_white().bold()
    );
    for output in &stats.outputs {
        println!("  {} {}", "Wrote".bright_green(), output.display());
    }
}
