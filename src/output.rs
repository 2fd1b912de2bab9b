//! Writing converted tables and their descriptions.
//!
//! A converted file produces the normalized table (CSV or Parquet) and,
//! optionally, a JSON data package descriptor carrying the caller's metadata
//! and the field schema of the table.

use crate::config::OutputFormat;
use crate::error::{ConverterError, Result};
use crate::models::{Field, Metadata};
use polars::prelude::*;
use serde_json::{Value, json};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};
use tracing::{debug, warn};

/// Path of an output file derived from an input file, without touching the disk.
///
/// The extension of `template` is replaced by `suffix`. The file lands in
/// `outdir` if given, next to the input otherwise.
pub fn output_path(template: &Path, suffix: &str, outdir: Option<&Path>) -> Result<PathBuf> {
    let stem = template
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .ok_or_else(|| ConverterError::ProcessingFailed {
            path: template.to_path_buf(),
            reason: "input path has no file name".to_string(),
        })?;

    let directory = match outdir {
        Some(outdir) => outdir.to_path_buf(),
        None => template
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };

    Ok(directory.join(format!("{}{}", stem, suffix)))
}

/// [`output_path`], creating missing directories
pub fn outfile(template: &Path, suffix: &str, outdir: Option<&Path>) -> Result<PathBuf> {
    let path = output_path(template, suffix, outdir)?;
    if let Some(directory) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(directory)?;
    }
    Ok(path)
}

/// Hidden temporary file in the directory of `path`
fn staging_file(path: &Path) -> Result<NamedTempFile> {
    let directory = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Builder::new()
        .prefix(&format!(".{}.", name))
        .suffix(".part")
        .tempfile_in(directory)?)
}

/// Move a finished temporary file to `path`; readers never see a partial file
fn commit(staged: NamedTempFile, path: &Path) -> Result<()> {
    staged.persist(path).map_err(|err| err.error)?;
    Ok(())
}

/// Write the table in the requested format
pub fn write_frame(df: &mut DataFrame, path: &Path, format: OutputFormat) -> Result<()> {
    debug!(
        "Writing {} rows to {} ({:?})",
        df.height(),
        path.display(),
        format
    );

    let mut staged = staging_file(path)?;
    match format {
        OutputFormat::Csv => {
            CsvWriter::new(staged.as_file_mut())
                .include_header(true)
                .finish(df)?;
        }
        OutputFormat::Parquet => {
            ParquetWriter::new(staged.as_file_mut()).finish(df)?;
        }
    }
    commit(staged, path)
}

/// Read a YAML metadata document; the top level must be a mapping
pub fn read_metadata(path: &Path) -> Result<Metadata> {
    let text = fs::read_to_string(path)?;
    parse_metadata(&text)
}

/// Parse YAML metadata. Timestamps stay strings.
pub fn parse_metadata(text: &str) -> Result<Metadata> {
    if text.trim().is_empty() {
        return Ok(Metadata::new());
    }
    let value: Value = serde_yaml::from_str(text)?;
    match value {
        Value::Object(metadata) => Ok(metadata),
        Value::Null => Ok(Metadata::new()),
        other => Err(ConverterError::InvalidMetadata {
            reason: format!("expected a mapping at the top level, found {}", kind(&other)),
        }),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

/// Data package descriptor for one converted table.
///
/// Metadata keys are copied to the top level; the table is described by
/// a single resource whose schema lists `fields`.
pub fn package_descriptor(
    table: &Path,
    format: OutputFormat,
    fields: &[Field],
    metadata: &Metadata,
) -> Result<Value> {
    let mut descriptor = metadata.clone();
    if descriptor.contains_key("resources") {
        warn!("Metadata defines 'resources', replacing it with the converted table");
    }

    let name = table
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let path = table
        .file_name()
        .map(|file| file.to_string_lossy().into_owned())
        .unwrap_or_default();

    descriptor.insert(
        "resources".to_string(),
        json!([{
            "name": name,
            "path": path,
            "format": format.suffix().trim_start_matches('.'),
            "mediatype": format.mediatype(),
            "schema": { "fields": serde_json::to_value(fields)? },
        }]),
    );
    descriptor
        .entry("created".to_string())
        .or_insert_with(|| Value::String(chrono::Utc::now().to_rfc3339()));

    Ok(Value::Object(descriptor))
}

/// Write the descriptor of `table` next to it as `<stem>.json`
pub fn write_package(
    table: &Path,
    format: OutputFormat,
    fields: &[Field],
    metadata: &Metadata,
) -> Result<PathBuf> {
    let descriptor = package_descriptor(table, format, fields, metadata)?;
    let path = table.with_extension("json");
    let mut staged = staging_file(&path)?;
    staged.write_all(serde_json::to_string_pretty(&descriptor)?.as_bytes())?;
    commit(staged, &path)?;
    debug!("Wrote package descriptor {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_outfile_next_to_input() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("cv.mpt");
        let path = outfile(&input, ".csv", None).unwrap();
        assert_eq!(path, temp_dir.path().join("cv.csv"));
    }

    #[test]
    fn test_outfile_creates_outdir() {
        let temp_dir = TempDir::new().unwrap();
        let outdir = temp_dir.path().join("converted").join("2021");
        let path = outfile(Path::new("raw/cv.DTA.dat"), ".parquet", Some(&outdir)).unwrap();

        assert!(outdir.is_dir());
        assert_eq!(path, outdir.join("cv.DTA.parquet"));
    }

    #[test]
    fn test_output_path_does_not_create_directories() {
        let temp_dir = TempDir::new().unwrap();
        let outdir = temp_dir.path().join("converted");
        let path = output_path(Path::new("a/cv.mpt"), ".csv", Some(&outdir)).unwrap();

        assert_eq!(path, outdir.join("cv.csv"));
        assert!(!outdir.exists());
        assert!(output_path(Path::new(""), ".csv", None).is_err());
    }

    #[test]
    fn test_writes_leave_no_temporary_files() {
        let temp_dir = TempDir::new().unwrap();
        let table = temp_dir.path().join("cv.csv");
        let mut df = df!("t" => [0.0, 1.5]).unwrap();

        write_frame(&mut df, &table, OutputFormat::Csv).unwrap();
        write_package(&table, OutputFormat::Csv, &[], &Metadata::new()).unwrap();

        let mut names: Vec<String> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["cv.csv", "cv.json"]);
    }

    #[test]
    fn test_rewrite_replaces_previous_output() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.csv");
        fs::write(&path, "stale contents that are longer than the new table\n").unwrap();
        let mut df = df!("t" => [1]).unwrap();

        write_frame(&mut df, &path, OutputFormat::Csv).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "t\n1\n");
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("out.csv");
        let mut df = df!("t" => [1]).unwrap();
        assert!(write_frame(&mut df, &path, OutputFormat::Csv).is_err());
    }

    #[test]
    fn test_write_csv() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.csv");
        let mut df = df!("t" => [0.0, 1.5], "E" => [0.1, 0.2]).unwrap();

        write_frame(&mut df, &path, OutputFormat::Csv).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().next(), Some("t,E"));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_write_parquet() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.parquet");
        let mut df = df!("t" => [0.0, 1.5], "I" => [1.0, 2.0]).unwrap();

        write_frame(&mut df, &path, OutputFormat::Parquet).unwrap();

        let read = ParquetReader::new(fs::File::open(&path).unwrap())
            .finish()
            .unwrap();
        assert!(read.equals(&df));
    }

    #[test]
    fn test_parse_metadata_keeps_dates_as_strings() {
        let metadata = parse_metadata("curation:\n  date: 2021-07-09\nsystem:\n  type: electrochemical\n").unwrap();
        assert_eq!(metadata["curation"]["date"], json!("2021-07-09"));
        assert_eq!(metadata["system"]["type"], json!("electrochemical"));
    }

    #[test]
    fn test_parse_metadata_rejects_sequences() {
        let err = parse_metadata("- a\n- b\n").unwrap_err();
        assert!(matches!(err, ConverterError::InvalidMetadata { .. }));
        assert!(parse_metadata("").unwrap().is_empty());
    }

    #[test]
    fn test_package_descriptor() {
        let mut metadata = Metadata::new();
        metadata.insert("source".to_string(), json!({"citation key": "a2021"}));
        let fields = vec![Field::new("t").with_unit("s"), Field::new("E").with_unit("V")];

        let descriptor =
            package_descriptor(Path::new("out/CV_1.csv"), OutputFormat::Csv, &fields, &metadata)
                .unwrap();

        assert_eq!(descriptor["source"]["citation key"], "a2021");
        let resource = &descriptor["resources"][0];
        assert_eq!(resource["name"], "cv_1");
        assert_eq!(resource["path"], "CV_1.csv");
        assert_eq!(resource["format"], "csv");
        assert_eq!(resource["mediatype"], "text/csv");
        assert_eq!(
            resource["schema"]["fields"],
            json!([{"name": "t", "unit": "s"}, {"name": "E", "unit": "V"}])
        );
        assert!(descriptor["created"].is_string());
    }

    #[test]
    fn test_write_package_next_to_table() {
        let temp_dir = TempDir::new().unwrap();
        let table = temp_dir.path().join("cv.parquet");
        let path = write_package(&table, OutputFormat::Parquet, &[], &Metadata::new()).unwrap();

        assert_eq!(path, temp_dir.path().join("cv.json"));
        let descriptor: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(descriptor["resources"][0]["format"], "parquet");
    }
}
