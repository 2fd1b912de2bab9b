//! Column name synthesis from one or more descriptor lines.

use crate::error::{ConverterError, Result};

/// Separator between the parts (name, unit, ...) of a synthesized column name
pub const NAME_SEPARATOR: &str = " / ";

/// Delimiters framing every line of a table without separating two columns.
///
/// Gamry starts each line with a tab, EC-Lab ends each line with one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Padding {
    pub leading: bool,
    pub trailing: bool,
}

impl Padding {
    /// Padding of a table, read off its first descriptor line
    pub fn detect(descriptor: &str, delimiter: u8) -> Self {
        let line = descriptor.trim_end_matches('\r');
        let delimiter = delimiter as char;
        Self {
            leading: line.starts_with(delimiter),
            trailing: line.len() > 1 && line.ends_with(delimiter),
        }
    }

    /// Remove at most one padding delimiter from each end; empty cells keep their position
    pub fn strip<'a>(&self, line: &'a str, delimiter: u8) -> &'a str {
        let delimiter = delimiter as char;
        let mut line = line.trim_end_matches('\r');
        if self.leading {
            line = line.strip_prefix(delimiter).unwrap_or(line);
        }
        if self.trailing {
            line = line.strip_suffix(delimiter).unwrap_or(line);
        }
        line
    }
}

/// Split a descriptor line into tokens with surrounding spaces removed
pub fn split_descriptor(line: &str, delimiter: u8) -> Vec<String> {
    line.trim_end_matches('\r')
        .split(delimiter as char)
        .map(|token| token.trim().to_string())
        .collect()
}

/// Build one name per column from the descriptor lines.
///
/// A single line is returned verbatim. Several lines are combined column-wise,
/// so `["T,v", "K,m/s"]` becomes `["T / K", "v / m/s"]`. Lines with different
/// token counts are rejected instead of being truncated to the shortest line.
pub fn synthesize_column_names(lines: &[&str], delimiter: u8) -> Result<Vec<String>> {
    let rows: Vec<Vec<String>> = lines
        .iter()
        .map(|line| split_descriptor(line, delimiter))
        .collect();

    match rows.as_slice() {
        [] => Ok(Vec::new()),
        [single] => Ok(single.clone()),
        [first, rest @ ..] => {
            if rest.iter().any(|row| row.len() != first.len()) {
                return Err(ConverterError::RaggedDescriptors {
                    lengths: rows.iter().map(Vec::len).collect(),
                });
            }

            Ok((0..first.len())
                .map(|column| {
                    rows.iter()
                        .map(|row| row[column].as_str())
                        .collect::<Vec<_>>()
                        .join(NAME_SEPARATOR)
                })
                .collect())
        }
    }
}
