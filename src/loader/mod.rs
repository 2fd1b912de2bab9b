//! Loaders for delimiter-separated instrument exports.
//!
//! Every export is a block of free-text header lines, one or more lines
//! describing the columns, and the data rows. A [`Loader`] works out where
//! each block starts for the selected [`Device`], synthesizes one name per
//! column, detects the decimal separator, and hands the data rows to a
//! [`TableParser`].
//!
//! ## Architecture
//!
//! - [`raw`] - in-memory copy of the file
//! - [`names`] - column names from one or more descriptor lines
//! - [`delimiter`] - delimiter sniffing for plain CSV
//! - [`table`] - text-to-frame parsing via polars
//! - [`eclab`], [`gamry`] - vendor header conventions
//!
//! ## Usage
//!
//! ```rust
//! use echem_converter::loader::{Loader, RawFile};
//! use echem_converter::models::Device;
//!
//! # fn example() -> echem_converter::error::Result<()> {
//! let raw = RawFile::new("EC-Lab ASCII FILE\nNb header lines : 4\n\nmode\ttime/s\n2\t0,5\n");
//! let loader = Loader::create(Device::ECLab, raw);
//! assert_eq!(loader.header_lines()?, 3);
//! assert_eq!(loader.column_names()?, vec!["mode", "time/s"]);
//! # Ok(())
//! # }
//! ```

pub mod delimiter;
pub mod eclab;
pub mod gamry;
pub mod names;
pub mod raw;
pub mod table;

pub use delimiter::{DelimiterDetector, SniffingDetector};
pub use names::{Padding, synthesize_column_names};
pub use raw::RawFile;
pub use table::{PolarsTableParser, TableParser};

use crate::config::ConverterConfig;
use crate::error::{ConverterError, Result};
use crate::models::{Decimal, Device, HeaderLayout, Metadata};
use polars::prelude::DataFrame;
use std::sync::Arc;
use tracing::debug;

/// Header conventions of one device
#[derive(Debug, Clone, Copy)]
pub(crate) struct VendorProfile {
    /// Number of lines before the column descriptors
    pub locate_header: fn(&[&str]) -> Result<usize>,
    pub column_header_lines: usize,
    /// Decimal separator from the data rows
    pub detect_decimal: fn(&[&str]) -> Result<Decimal>,
    /// Fixed delimiter, or `None` to sniff it
    pub delimiter: Option<u8>,
}

const GENERIC_PROFILE: VendorProfile = VendorProfile {
    locate_header: generic_header,
    column_header_lines: 1,
    detect_decimal: generic_decimal,
    delimiter: None,
};

fn generic_header(_lines: &[&str]) -> Result<usize> {
    Ok(0)
}

fn generic_decimal(_data: &[&str]) -> Result<Decimal> {
    Err(ConverterError::not_implemented(
        "decimal detection for plain CSV files",
    ))
}

impl Device {
    pub(crate) fn profile(&self) -> &'static VendorProfile {
        match self {
            Device::Generic => &GENERIC_PROFILE,
            Device::ECLab => &eclab::PROFILE,
            Device::Gamry => &gamry::PROFILE,
        }
    }
}

/// Loads the tabular data of an instrument export.
///
/// All accessors recompute their result from the buffered text.
#[derive(Debug, Clone)]
pub struct Loader {
    raw: RawFile,
    device: Device,
    header_lines: Option<usize>,
    column_header_lines: Option<usize>,
    detector: Arc<dyn DelimiterDetector>,
    parser: Arc<dyn TableParser>,
}

impl Loader {
    /// Loader for a plain CSV file with a single line of column names
    pub fn new(raw: RawFile) -> Self {
        Self::create(Device::Generic, raw)
    }

    /// Loader for the export format of `device`
    pub fn create(device: Device, raw: RawFile) -> Self {
        Self {
            raw,
            device,
            header_lines: None,
            column_header_lines: None,
            detector: Arc::new(SniffingDetector::default()),
            parser: Arc::new(PolarsTableParser::default()),
        }
    }

    /// Loader with the sniffer and parser tuned by `config`
    pub fn from_config(config: &ConverterConfig, raw: RawFile) -> Self {
        Self::create(config.device, raw)
            .with_detector(SniffingDetector::new(config.delimiter_sample_lines))
            .with_parser(PolarsTableParser::new(config.infer_schema_length))
    }

    /// Header line count for plain CSV files; vendor loaders locate it themselves
    pub fn with_header_lines(mut self, header_lines: usize) -> Self {
        self.header_lines = Some(header_lines);
        self
    }

    /// Descriptor line count for plain CSV files; vendor loaders know their own
    pub fn with_column_header_lines(mut self, column_header_lines: usize) -> Self {
        self.column_header_lines = Some(column_header_lines);
        self
    }

    pub fn with_detector(mut self, detector: impl DelimiterDetector + 'static) -> Self {
        self.detector = Arc::new(detector);
        self
    }

    pub fn with_parser(mut self, parser: impl TableParser + 'static) -> Self {
        self.parser = Arc::new(parser);
        self
    }

    pub fn device(&self) -> Device {
        self.device
    }

    pub fn raw(&self) -> &RawFile {
        &self.raw
    }

    /// Number of header lines, excluding the column descriptor lines
    pub fn header_lines(&self) -> Result<usize> {
        match (self.device, self.header_lines) {
            (Device::Generic, Some(header_lines)) => Ok(header_lines),
            _ => (self.device.profile().locate_header)(&self.raw.lines()),
        }
    }

    /// The header lines (excluding the column descriptors)
    pub fn header(&self) -> Result<Vec<&str>> {
        let lines = self.raw.lines();
        let end = self.header_lines()?.min(lines.len());
        Ok(lines[..end].to_vec())
    }

    /// Number of lines describing the columns
    pub fn column_header_lines(&self) -> usize {
        match (self.device, self.column_header_lines) {
            (Device::Generic, Some(lines)) if lines > 0 => lines,
            _ => self.device.profile().column_header_lines,
        }
    }

    /// The lines describing the columns
    pub fn column_headers(&self) -> Result<Vec<&str>> {
        let lines = self.raw.lines();
        let start = self.header_lines()?.min(lines.len());
        let end = (start + self.column_header_lines()).min(lines.len());
        Ok(lines[start..end].to_vec())
    }

    /// One name per column, combining multiple descriptor lines with " / "
    pub fn column_header_names(&self) -> Result<Vec<String>> {
        let delimiter = self.delimiter()?;
        let padding = self.padding()?;
        let descriptors: Vec<&str> = self
            .column_headers()?
            .into_iter()
            .map(|line| padding.strip(line, delimiter))
            .collect();
        synthesize_column_names(&descriptors, delimiter)
    }

    /// Delimiters framing each line, read off the first descriptor line
    pub fn padding(&self) -> Result<Padding> {
        let delimiter = self.delimiter()?;
        Ok(self
            .column_headers()?
            .first()
            .map(|line| Padding::detect(line, delimiter))
            .unwrap_or_default())
    }

    /// The data rows following the column descriptors
    pub fn data(&self) -> Result<Vec<&str>> {
        let lines = self.raw.lines();
        let start = (self.header_lines()? + self.column_header_lines()).min(lines.len());
        Ok(lines[start..].to_vec())
    }

    /// Field delimiter: fixed for vendor formats, sniffed for plain CSV
    pub fn delimiter(&self) -> Result<u8> {
        if let Some(delimiter) = self.device.profile().delimiter {
            return Ok(delimiter);
        }

        let data = self.data()?;
        let sample = if data.iter().any(|line| !line.trim().is_empty()) {
            data
        } else {
            self.column_headers()?
        };

        Ok(self.detector.detect(&sample).unwrap_or_else(|| {
            debug!("No delimiter detected, assuming ','");
            b','
        }))
    }

    /// Decimal separator of the numbers in the data rows.
    ///
    /// Plain CSV files carry no hint, so the generic loader refuses to guess.
    pub fn decimal(&self) -> Result<Decimal> {
        (self.device.profile().detect_decimal)(&self.data()?)
    }

    pub fn layout(&self) -> Result<HeaderLayout> {
        Ok(HeaderLayout {
            header_lines: self.header_lines()?,
            column_header_lines: self.column_header_lines(),
            decimal: self.decimal()?,
        })
    }

    /// The data as a frame whose columns carry the synthesized names
    pub fn df(&self) -> Result<DataFrame> {
        let columns = self.column_header_names()?;
        let delimiter = self.delimiter()?;
        let decimal = match self.device {
            Device::Generic => Decimal::Point,
            _ => self.decimal()?,
        };

        let padding = self.padding()?;
        let rows: Vec<&str> = self
            .data()?
            .into_iter()
            .filter(|row| !row.trim_matches([' ', '\r']).is_empty())
            .map(|row| padding.strip(row, delimiter))
            .collect();

        debug!(
            "Parsing {} rows of {} data: {} columns, delimiter {:?}, decimal {:?}",
            rows.len(),
            self.device,
            columns.len(),
            delimiter as char,
            decimal.as_char()
        );

        self.parser
            .parse_table(&rows.join("\n"), &columns, delimiter, decimal)
    }

    /// Column names of the loaded frame
    pub fn column_names(&self) -> Result<Vec<String>> {
        Ok(self
            .df()?
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect())
    }

    /// Metadata for the file: the supplied metadata, none taken from the header
    pub fn augment(&self, metadata: Option<Metadata>) -> Metadata {
        metadata.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests;
