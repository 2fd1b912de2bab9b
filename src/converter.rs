//! Conversion pipeline for a single file.
//!
//! Loads the raw export with the device's [`Loader`], maps vendor columns
//! onto `t`, `E`, `I` with the device's [`Adapter`], and writes the
//! normalized table (plus an optional package descriptor).

use crate::adapter::{Adapter, declared_fields};
use crate::config::ConverterConfig;
use crate::error::{ConverterError, Result};
use crate::loader::{Loader, RawFile};
use crate::models::{Device, Field, Metadata};
use crate::output;
use polars::prelude::DataFrame;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Result of converting one raw file
#[derive(Debug, Clone)]
pub struct Conversion {
    pub frame: DataFrame,
    /// One field per column of `frame`, in the same order
    pub fields: Vec<Field>,
    pub metadata: Metadata,
}

impl Conversion {
    pub fn rows(&self) -> usize {
        self.frame.height()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect()
    }
}

/// Files written for one converted input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedFile {
    pub table: PathBuf,
    pub package: Option<PathBuf>,
    pub rows: usize,
}

impl ConvertedFile {
    pub fn outputs(&self) -> Vec<PathBuf> {
        std::iter::once(self.table.clone())
            .chain(self.package.clone())
            .collect()
    }
}

/// Convert the text of an export produced by `device`
pub fn convert(raw: RawFile, device: Device, metadata: Option<Metadata>) -> Result<Conversion> {
    convert_loaded(&Loader::create(device, raw), metadata)
}

/// Convert with a preconfigured loader.
///
/// Plain CSV files keep their columns untouched and are not checked for
/// the core dimensions. Vendor exports are renamed and must provide a
/// time, voltage and current axis.
pub fn convert_loaded(loader: &Loader, metadata: Option<Metadata>) -> Result<Conversion> {
    let metadata = loader.augment(metadata);
    let declared = declared_fields(&metadata)?;

    let (frame, fields) = match loader.device() {
        Device::Generic => {
            let frame = loader.df()?;
            let columns: Vec<String> = frame
                .get_column_names()
                .iter()
                .map(|name| name.to_string())
                .collect();
            let fields = Adapter::generic().derive_fields(&columns, declared.as_deref());
            (frame, fields)
        }
        device => Adapter::create(device).build(loader, declared.as_deref())?,
    };

    debug!(
        "Converted {} data: {} rows, columns {:?}",
        loader.device(),
        frame.height(),
        fields.iter().map(|field| field.name.as_str()).collect::<Vec<_>>()
    );

    Ok(Conversion {
        frame,
        fields,
        metadata,
    })
}

/// Read, convert and write one file according to `config`
pub fn convert_file(
    path: &Path,
    config: &ConverterConfig,
    metadata: Option<Metadata>,
) -> Result<ConvertedFile> {
    let raw = RawFile::open(path)?;
    let loader = Loader::from_config(config, raw);
    let mut conversion = convert_loaded(&loader, metadata)?;

    let table = output::outfile(
        path,
        config.output_format.suffix(),
        config.output_dir.as_deref(),
    )?;
    if table.exists() && fs::canonicalize(&table)? == fs::canonicalize(path)? {
        return Err(ConverterError::ProcessingFailed {
            path: path.to_path_buf(),
            reason: format!("output {} would overwrite the input", table.display()),
        });
    }
    output::write_frame(&mut conversion.frame, &table, config.output_format)?;

    let package = if config.write_package {
        Some(output::write_package(
            &table,
            config.output_format,
            &conversion.fields,
            &conversion.metadata,
        )?)
    } else {
        None
    };

    info!(
        "Converted {} -> {} ({} rows)",
        path.display(),
        table.display(),
        conversion.rows()
    );

    Ok(ConvertedFile {
        table,
        package,
        rows: conversion.rows(),
    })
}
