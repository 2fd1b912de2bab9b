//! Configuration for conversion runs.
//!
//! Collects the caller-facing knobs: which device produced the files,
//! where and how outputs are written, and the tuning of the delimiter
//! sniffer and the tabular parser.

use crate::models::Device;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// File format for the normalized table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Parquet,
}

impl OutputFormat {
    /// Extension (with leading dot) used for output files
    pub fn suffix(&self) -> &'static str {
        match self {
            OutputFormat::Csv => ".csv",
            OutputFormat::Parquet => ".parquet",
        }
    }

    /// Mediatype recorded in package descriptors
    pub fn mediatype(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "text/csv",
            OutputFormat::Parquet => "application/vnd.apache.parquet",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "parquet" => Ok(OutputFormat::Parquet),
            other => Err(format!(
                "unknown output format '{}' (expected csv or parquet)",
                other
            )),
        }
    }
}

/// Main configuration for converting electrochemistry files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Device whose loader and rename table are used
    pub device: Device,

    /// Directory for output files (defaults to the directory of each input)
    pub output_dir: Option<PathBuf>,

    /// Format of the normalized table
    pub output_format: OutputFormat,

    /// Also write a JSON data package descriptor next to the table
    pub write_package: bool,

    /// Number of files converted concurrently in batch mode
    pub max_concurrent_files: usize,

    /// Data lines sampled when sniffing the delimiter of plain CSV files
    pub delimiter_sample_lines: usize,

    /// Rows used by the tabular parser to infer column types
    pub infer_schema_length: usize,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            device: Device::Generic,
            output_dir: None,
            output_format: OutputFormat::Csv,
            write_package: false,
            max_concurrent_files: num_cpus::get(),
            // Sniffing stays cheap on files with many columns
            delimiter_sample_lines: 2,
            infer_schema_length: 100,
        }
    }
}

impl ConverterConfig {
    pub fn with_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(output_dir.into());
        self
    }

    pub fn with_output_format(mut self, output_format: OutputFormat) -> Self {
        self.output_format = output_format;
        self
    }

    pub fn with_package(mut self) -> Self {
        self.write_package = true;
        self
    }

    /// Set maximum concurrent files (at least one)
    pub fn with_max_concurrent_files(mut self, max_files: usize) -> Self {
        self.max_concurrent_files = max_files.max(1);
        self
    }

    pub fn with_delimiter_sample_lines(mut self, lines: usize) -> Self {
        self.delimiter_sample_lines = lines.max(1);
        self
    }

    pub fn with_infer_schema_length(mut self, rows: usize) -> Self {
        self.infer_schema_length = rows;
        self
    }
}
