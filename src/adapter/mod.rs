//! Mapping of vendor columns onto the core electrochemical dimensions.
//!
//! An [`Adapter`] renames the columns of a loaded file to the canonical
//! names (`t`, `E`, `I`, ...), attaches a [`Field`] description to every
//! column, and rejects data lacking a time, voltage or current axis.
//!
//! Field attributes are merged in this order of precedence:
//! 1. fields declared by the caller (usually from a metadata file)
//! 2. the device's catalogue of known columns
//!
//! The output order always follows the columns of the loaded file.

pub mod catalogue;

pub use catalogue::KnownColumn;

use crate::error::{ConverterError, Result};
use crate::loader::Loader;
use crate::models::{Device, Field, Metadata};
use polars::prelude::DataFrame;
use tracing::{debug, warn};

/// Accepted column names for each core dimension
pub const CORE_DIMENSIONS: [(&str, &[&str]); 3] = [
    ("time", &["t"]),
    ("voltage", &["E", "U"]),
    ("current", &["I", "j"]),
];

/// Comment attached to columns the caller did not describe
pub const GENERATED_COMMENT: &str = "Created by echem_converter.";

/// Check that the names cover time, voltage and current
pub fn validate_core_dimensions<S: AsRef<str>>(names: &[S]) -> Result<()> {
    for (dimension, accepted) in CORE_DIMENSIONS {
        if !names
            .iter()
            .any(|name| accepted.contains(&name.as_ref()))
        {
            return Err(ConverterError::MissingDimension {
                dimension: dimension.to_string(),
            });
        }
    }
    Ok(())
}

/// Field list declared in metadata under `figure description`
///
/// Both `figure description.schema.fields` and `figure description.fields`
/// are accepted. Returns `None` when neither is present.
pub fn declared_fields(metadata: &Metadata) -> Result<Option<Vec<Field>>> {
    let Some(description) = metadata.get("figure description") else {
        return Ok(None);
    };

    let fields = description
        .get("schema")
        .and_then(|schema| schema.get("fields"))
        .or_else(|| description.get("fields"));

    match fields {
        None => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| ConverterError::InvalidMetadata {
                reason: format!("figure description fields: {}", e),
            }),
    }
}

/// Normalizes the columns of one device's exports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adapter {
    device: Device,
}

impl Adapter {
    pub fn create(device: Device) -> Self {
        Self { device }
    }

    /// Adapter keeping the column names of plain CSV files
    pub fn generic() -> Self {
        Self::create(Device::Generic)
    }

    pub fn device(&self) -> Device {
        self.device
    }

    /// Vendor column names and their canonical replacements
    pub fn rename_table(&self) -> &'static [(&'static str, &'static str)] {
        match self.device {
            Device::Generic => &[],
            Device::ECLab => catalogue::ECLAB_RENAME,
            Device::Gamry => catalogue::GAMRY_RENAME,
        }
    }

    /// Columns the device is known to export
    pub fn catalogue(&self) -> &'static [KnownColumn] {
        match self.device {
            Device::Generic => &[],
            Device::ECLab => catalogue::ECLAB_COLUMNS,
            Device::Gamry => catalogue::GAMRY_COLUMNS,
        }
    }

    fn canonical_name(&self, name: &str) -> Option<&'static str> {
        self.rename_table()
            .iter()
            .find(|(source, _)| *source == name)
            .map(|(_, target)| *target)
    }

    /// One field per raw column, in raw column order.
    ///
    /// A declared field is matched by the raw column name or by the name the
    /// column is renamed to. Raw columns without a declared field fall back
    /// to the catalogue; if `declared` was given, remaining columns are marked
    /// with [`GENERATED_COMMENT`].
    pub fn derive_fields(&self, raw_columns: &[String], declared: Option<&[Field]>) -> Vec<Field> {
        let fields: Vec<Field> = raw_columns
            .iter()
            .map(|name| {
                let known = self
                    .catalogue()
                    .iter()
                    .find(|column| column.name == name.as_str())
                    .map(KnownColumn::to_field);

                let matched = declared.and_then(|declared| {
                    let canonical = self.canonical_name(name);
                    declared
                        .iter()
                        .find(|field| field.name == *name)
                        .or_else(|| {
                            canonical.and_then(|canonical| {
                                declared.iter().find(|field| field.name == canonical)
                            })
                        })
                });

                match (matched, known) {
                    (Some(field), Some(known)) => Field {
                        name: name.clone(),
                        ..field.clone()
                    }
                    .or_defaults(&known),
                    (Some(field), None) => Field {
                        name: name.clone(),
                        ..field.clone()
                    },
                    (None, Some(known)) => known,
                    (None, None) if declared.is_some() => {
                        Field::new(name.as_str()).with_comment(GENERATED_COMMENT)
                    }
                    (None, None) => Field::new(name.as_str()),
                }
            })
            .collect();

        if let Some(declared) = declared {
            for field in declared {
                let used = raw_columns.iter().any(|name| {
                    *name == field.name || self.canonical_name(name) == Some(field.name.as_str())
                });
                if !used {
                    warn!("Declared field '{}' has no matching column, dropping it", field.name);
                }
            }
        }

        fields
    }

    /// Replace vendor column names with canonical names, keeping positions
    pub fn rename_fields(&self, fields: Vec<Field>) -> Vec<Field> {
        fields
            .into_iter()
            .map(|mut field| {
                if let Some(canonical) = self.canonical_name(&field.name) {
                    debug!("Renaming column '{}' to '{}'", field.name, canonical);
                    field.name = canonical.to_string();
                }
                field
            })
            .collect()
    }

    /// Final field list for the raw columns, validated against the core dimensions
    pub fn fields(&self, raw_columns: &[String], declared: Option<&[Field]>) -> Result<Vec<Field>> {
        let fields = self.rename_fields(self.derive_fields(raw_columns, declared));
        let names: Vec<&str> = fields.iter().map(|field| field.name.as_str()).collect();
        validate_core_dimensions(&names)?;
        Ok(fields)
    }

    /// The loader's frame with canonical column names, and its field list
    pub fn build(&self, loader: &Loader, declared: Option<&[Field]>) -> Result<(DataFrame, Vec<Field>)> {
        let mut df = loader.df()?;
        let raw_columns: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();

        let fields = self.fields(&raw_columns, declared)?;
        df.set_column_names(fields.iter().map(|field| field.name.as_str()))?;

        Ok((df, fields))
    }
}
