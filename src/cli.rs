//! Command-line interface components.

use crate::config::{ConverterConfig, OutputFormat};
use crate::error::ConverterError;
use crate::models::Device;
use anyhow::{Context, Result};
use clap::Parser;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(name = "echem-convert")]
#[command(about = "Convert electrochemistry instrument exports into normalized t/E/I tables")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Input files, directories or glob patterns
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<String>,

    /// Instrument software that produced the files (generic, eclab, gamry)
    #[arg(short, long)]
    pub device: Option<String>,

    /// Output directory (defaults to the directory of each input)
    #[arg(short, long)]
    pub outdir: Option<PathBuf>,

    /// YAML metadata attached to every converted file
    #[arg(short, long)]
    pub metadata: Option<PathBuf>,

    /// Also write a JSON data package descriptor for every table
    #[arg(long)]
    pub package: bool,

    /// Output format (csv, parquet)
    #[arg(short, long, default_value = "csv")]
    pub format: OutputFormat,

    /// Number of files converted concurrently (defaults to the CPU count)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Build the converter configuration from the arguments
    pub fn to_config(&self) -> Result<ConverterConfig> {
        let device = Device::select(self.device.as_deref())?;
        let mut config = ConverterConfig::default()
            .with_device(device)
            .with_output_format(self.format);

        if let Some(outdir) = &self.outdir {
            config = config.with_output_dir(outdir.clone());
        }
        if let Some(jobs) = self.jobs {
            config = config.with_max_concurrent_files(jobs);
        }
        if self.package {
            config = config.with_package();
        }
        Ok(config)
    }

    /// Log level for the tracing subscriber
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Default log filter covering the library and the binary
    pub fn log_filter(&self) -> String {
        let level = self.log_level();
        format!("echem_converter={level},echem_convert={level}")
    }
}

fn has_input_extension(path: &Path, device: Device) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            device
                .extensions()
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// Expand the command-line inputs into a list of files.
///
/// Files are taken as given, anything that is neither a file nor a directory
/// is treated as a glob pattern. Directories are walked for the extensions of
/// the configured device, skipping the output directory so earlier results
/// are not converted again. Duplicates are dropped, first occurrence wins.
pub fn collect_inputs(inputs: &[String], config: &ConverterConfig) -> Result<Vec<PathBuf>> {
    let outdir = config
        .output_dir
        .as_deref()
        .and_then(|dir| dir.canonicalize().ok());
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for input in inputs {
        let path = Path::new(input);
        let found: Vec<PathBuf> = if path.is_file() {
            vec![path.to_path_buf()]
        } else if path.is_dir() {
            let mut found = Vec::new();
            let walker = WalkDir::new(path)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|entry| {
                    !(entry.file_type().is_dir()
                        && outdir.as_deref().is_some_and(|outdir| {
                            entry.path().canonicalize().is_ok_and(|dir| dir == outdir)
                        }))
                });
            for entry in walker {
                let entry = entry
                    .with_context(|| format!("Failed to walk directory {}", path.display()))?;
                if entry.file_type().is_file() && has_input_extension(entry.path(), config.device)
                {
                    found.push(entry.into_path());
                }
            }
            found
        } else {
            let mut found = Vec::new();
            for entry in
                glob::glob(input).with_context(|| format!("Invalid glob pattern '{}'", input))?
            {
                let entry = entry.context("Failed to read glob match")?;
                if entry.is_file() {
                    found.push(entry);
                }
            }
            found
        };

        if found.is_empty() {
            return Err(ConverterError::InputNotFound {
                path: path.to_path_buf(),
            }
            .into());
        }

        debug!("Input '{}' matched {} files", input, found.len());
        for file in found {
            if seen.insert(file.clone()) {
                files.push(file);
            }
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "a,b\n0,0\n").unwrap();
    }

    #[test]
    fn test_args_to_config() {
        let args = Args::parse_from([
            "echem-convert",
            "--device",
            "eclab",
            "--format",
            "parquet",
            "--jobs",
            "0",
            "--package",
            "cv.mpt",
        ]);
        let config = args.to_config().unwrap();

        assert_eq!(config.device, Device::ECLab);
        assert_eq!(config.output_format, OutputFormat::Parquet);
        assert_eq!(config.max_concurrent_files, 1);
        assert!(config.write_package);
        assert!(config.output_dir.is_none());
        assert_eq!(args.log_level(), "info");
    }

    #[test]
    fn test_log_filter_covers_binary_target() {
        let args = Args::parse_from(["echem-convert", "-v", "cv.mpt"]);
        assert_eq!(args.log_filter(), "echem_converter=debug,echem_convert=debug");
    }

    #[test]
    fn test_unknown_device_is_rejected() {
        let args = Args::parse_from(["echem-convert", "-d", "autolab", "cv.txt"]);
        let err = args.to_config().unwrap_err();
        assert!(err.to_string().contains("autolab"));
    }

    #[test]
    fn test_inputs_are_required() {
        assert!(Args::try_parse_from(["echem-convert"]).is_err());
    }

    fn config(device: Device) -> ConverterConfig {
        ConverterConfig::default().with_device(device)
    }

    fn arg(path: &Path) -> String {
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_collect_directory_filters_extensions() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("b.mpt"));
        touch(&temp_dir.path().join("nested").join("a.DAT"));
        touch(&temp_dir.path().join("nested").join("c.DTA"));
        touch(&temp_dir.path().join("notes.txt"));
        touch(&temp_dir.path().join("a.csv"));
        let inputs = [arg(temp_dir.path())];

        assert_eq!(
            collect_inputs(&inputs, &config(Device::Gamry)).unwrap(),
            vec![
                temp_dir.path().join("nested").join("a.DAT"),
                temp_dir.path().join("nested").join("c.DTA"),
            ]
        );
        assert_eq!(
            collect_inputs(&inputs, &config(Device::ECLab)).unwrap(),
            vec![temp_dir.path().join("b.mpt")]
        );
        assert_eq!(
            collect_inputs(&inputs, &config(Device::Generic)).unwrap(),
            vec![temp_dir.path().join("a.csv")]
        );
    }

    #[test]
    fn test_collect_directory_skips_earlier_outputs() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("cv.mpt"));
        touch(&temp_dir.path().join("cv.csv"));
        touch(&temp_dir.path().join("out").join("lsv.csv"));
        touch(&temp_dir.path().join("raw").join("lsv.csv"));
        let inputs = [arg(temp_dir.path())];

        let files = collect_inputs(&inputs, &config(Device::ECLab)).unwrap();
        assert_eq!(files, vec![temp_dir.path().join("cv.mpt")]);

        let generic = config(Device::Generic).with_output_dir(temp_dir.path().join("out"));
        let files = collect_inputs(&inputs, &generic).unwrap();
        assert_eq!(
            files,
            vec![
                temp_dir.path().join("cv.csv"),
                temp_dir.path().join("raw").join("lsv.csv"),
            ]
        );
    }

    #[test]
    fn test_collect_glob_and_duplicates() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("cv_1.mpt"));
        touch(&temp_dir.path().join("cv_2.mpt"));
        touch(&temp_dir.path().join("eis.mpt"));

        let file = temp_dir.path().join("cv_1.mpt").to_string_lossy().into_owned();
        let pattern = temp_dir.path().join("cv_*.mpt").to_string_lossy().into_owned();
        let files = collect_inputs(&[file, pattern], &config(Device::ECLab)).unwrap();

        assert_eq!(
            files,
            vec![temp_dir.path().join("cv_1.mpt"), temp_dir.path().join("cv_2.mpt")]
        );
    }

    #[test]
    fn test_collect_missing_input() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.mpt").to_string_lossy().into_owned();
        let err = collect_inputs(&[missing], &config(Device::ECLab)).unwrap_err();
        assert!(err.to_string().contains("Input not found"));
    }
}
