//! Gamry Instruments Framework DAT files.
//!
//! The data block starts after a line `CURVE<TAB>TABLE<TAB><points>` and is
//! described by two lines: column names followed by their units.

use super::VendorProfile;
use crate::error::{ConverterError, Result};
use crate::models::{Decimal, Device};
use regex::Regex;
use std::sync::LazyLock;

static CURVE_TABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^CURVE\tTABLE\t(\d+)").expect("valid curve regex"));

pub(crate) const PROFILE: VendorProfile = VendorProfile {
    locate_header,
    column_header_lines: 2,
    detect_decimal,
    delimiter: Some(b'\t'),
};

/// A `CURVE TABLE` marker found in a DAT file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurveTable {
    /// Zero-based line index of the marker
    pub line: usize,
    /// Number of points the marker announces
    pub points: usize,
}

/// All curve markers in the file, in order
pub fn curve_tables(lines: &[&str]) -> Vec<CurveTable> {
    lines
        .iter()
        .enumerate()
        .filter_map(|(line, text)| {
            let captures = CURVE_TABLE.captures(text)?;
            let points = captures[1].parse().ok()?;
            Some(CurveTable { line, points })
        })
        .collect()
}

/// Number of lines up to and including the `CURVE TABLE` marker
pub fn locate_header(lines: &[&str]) -> Result<usize> {
    match curve_tables(lines).as_slice() {
        [] => Err(ConverterError::malformed_header(
            Device::Gamry,
            "no line matching 'CURVE<TAB>TABLE<TAB><N>'",
        )),
        [curve] => Ok(curve.line + 1),
        curves => Err(ConverterError::not_implemented(format!(
            "Gamry files with {} CURVE tables (multi-cycle exports)",
            curves.len()
        ))),
    }
}

/// Decimal separator from the second data row, or the first for single-point curves
pub fn detect_decimal(data: &[&str]) -> Result<Decimal> {
    Ok(match data.get(1).or(data.first()) {
        Some(row) if row.contains(',') => Decimal::Comma,
        _ => Decimal::Point,
    })
}
