//! Error handling for electrochemistry file conversion.
//!
//! Provides the error types raised while locating headers, parsing the
//! tabular data, and mapping vendor columns onto the core dimensions.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConverterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Device with name '{name}' is unknown to the converter")]
    UnknownDevice { name: String },

    #[error("Malformed {device} header: {reason}")]
    MalformedHeader { device: String, reason: String },

    #[error("No column with a '{dimension}' axis.")]
    MissingDimension { dimension: String },

    #[error("Not implemented: {feature}")]
    NotImplemented { feature: String },

    #[error("Column descriptor lines have unequal token counts: {lengths:?}")]
    RaggedDescriptors { lengths: Vec<usize> },

    #[error("Invalid metadata: {reason}")]
    InvalidMetadata { reason: String },

    #[error("Input not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Processing failed for file: {path} - {reason}")]
    ProcessingFailed { path: PathBuf, reason: String },
}

impl ConverterError {
    pub(crate) fn malformed_header(device: impl ToString, reason: impl Into<String>) -> Self {
        Self::MalformedHeader {
            device: device.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn not_implemented(feature: impl Into<String>) -> Self {
        Self::NotImplemented {
            feature: feature.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConverterError>;
