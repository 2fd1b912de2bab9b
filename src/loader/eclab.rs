//! BioLogic EC-Lab MPT files.
//!
//! An MPT header states its own length in a line `Nb header lines : N`,
//! where N counts the column name line as well. Columns are tab separated
//! and the unit is part of each column name (`time/s`, `Ewe/V`).

use super::VendorProfile;
use crate::error::{ConverterError, Result};
use crate::models::{Decimal, Device};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static HEADER_LINES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Nb header lines[ \t]*:[ \t]*(-?\d+\.?\d*)").expect("valid header regex")
});

pub(crate) const PROFILE: VendorProfile = VendorProfile {
    locate_header,
    column_header_lines: 1,
    detect_decimal,
    delimiter: Some(b'\t'),
};

/// Number of header lines preceding the column names
pub fn locate_header(lines: &[&str]) -> Result<usize> {
    let value = lines
        .iter()
        .find_map(|line| HEADER_LINES.captures(line))
        .map(|captures| captures[1].to_string())
        .ok_or_else(|| {
            ConverterError::malformed_header(Device::ECLab, "no line matching 'Nb header lines : <N>'")
        })?;

    let count: usize = value.parse().map_err(|_| {
        ConverterError::malformed_header(
            Device::ECLab,
            format!("'Nb header lines' is not a positive integer: {}", value),
        )
    })?;

    if count == 0 {
        return Err(ConverterError::malformed_header(
            Device::ECLab,
            "'Nb header lines' must include the column name line",
        ));
    }

    debug!("EC-Lab header declares {} lines", count);
    Ok(count - 1)
}

/// Decimal separator from the first data row
pub fn detect_decimal(data: &[&str]) -> Result<Decimal> {
    Ok(match data.first() {
        Some(row) if row.contains(',') => Decimal::Comma,
        _ => Decimal::Point,
    })
}
