//! Core data structures and types for electrochemistry conversion.
//!
//! Defines the supported devices, the header layout of a loaded file,
//! field descriptions for the converted columns, and processing statistics.

use crate::error::{ConverterError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Metadata supplied alongside a raw file, usually parsed from YAML
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Instrument software whose export format is understood by the converter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    /// Plain CSV with a single line of column names
    #[default]
    Generic,
    /// BioLogic EC-Lab MPT export
    ECLab,
    /// Gamry Instruments Framework DAT export
    Gamry,
}

impl Device {
    /// Select a device from an optional selector string, defaulting to the generic loader
    pub fn select(selector: Option<&str>) -> Result<Self> {
        match selector {
            None => Ok(Device::Generic),
            Some(name) => name.parse(),
        }
    }

    /// Selector string accepted on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Device::Generic => "generic",
            Device::ECLab => "eclab",
            Device::Gamry => "gamry",
        }
    }

    /// File extensions this device's software writes, lower case
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Device::Generic => &["csv"],
            Device::ECLab => &["mpt"],
            Device::Gamry => &["dta", "dat"],
        }
    }
}

impl FromStr for Device {
    type Err = ConverterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "generic" => Ok(Device::Generic),
            "eclab" => Ok(Device::ECLab),
            "gamry" => Ok(Device::Gamry),
            _ => Err(ConverterError::UnknownDevice {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fractional separator used by the numbers in the data section
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decimal {
    #[default]
    Point,
    Comma,
}

impl Decimal {
    pub fn as_char(&self) -> char {
        match self {
            Decimal::Point => '.',
            Decimal::Comma => ',',
        }
    }

    pub fn is_comma(&self) -> bool {
        matches!(self, Decimal::Comma)
    }
}

/// Where the header ends and how the numbers are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderLayout {
    /// Lines before the column descriptors
    pub header_lines: usize,
    /// Lines describing the columns (name, then unit, ...)
    pub column_header_lines: usize,
    pub decimal: Decimal,
}

/// Description of a single column of the converted data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// Attributes this crate does not interpret (e.g. `type`), kept verbatim
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_dimension(mut self, dimension: impl Into<String>) -> Self {
        self.dimension = Some(dimension.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Fill attributes missing on `self` from `defaults`; attributes already set win
    pub fn or_defaults(mut self, defaults: &Field) -> Self {
        self.unit = self.unit.or_else(|| defaults.unit.clone());
        self.reference = self.reference.or_else(|| defaults.reference.clone());
        self.dimension = self.dimension.or_else(|| defaults.dimension.clone());
        self.description = self.description.or_else(|| defaults.description.clone());
        self.comment = self.comment.or_else(|| defaults.comment.clone());
        for (key, value) in &defaults.extra {
            self.extra
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
        self
    }
}

/// Statistics of a batch conversion run
#[derive(Debug, Default)]
pub struct ConversionStats {
    pub files_converted: usize,
    pub files_failed: usize,
    pub total_rows: usize,
    pub outputs: Vec<PathBuf>,
    pub processing_time_ms: u128,
}
