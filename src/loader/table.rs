//! Tabular parsing of the data section.
//!
//! The loaders only decide where the data starts, how columns are named,
//! and which decimal separator is used; turning text into typed columns is
//! left to polars' CSV reader.

use crate::error::Result;
use crate::models::Decimal;
use polars::prelude::*;
use std::fmt;
use std::io::Cursor;
use tracing::debug;

/// Turns delimiter-separated text into a frame with the given column names
pub trait TableParser: fmt::Debug + Send + Sync {
    fn parse_table(
        &self,
        data: &str,
        columns: &[String],
        delimiter: u8,
        decimal: Decimal,
    ) -> Result<DataFrame>;
}

/// Table parser backed by the polars CSV reader
#[derive(Debug, Clone)]
pub struct PolarsTableParser {
    infer_schema_length: usize,
}

impl Default for PolarsTableParser {
    fn default() -> Self {
        Self::new(100)
    }
}

impl PolarsTableParser {
    pub fn new(infer_schema_length: usize) -> Self {
        Self {
            infer_schema_length,
        }
    }
}

impl TableParser for PolarsTableParser {
    fn parse_table(
        &self,
        data: &str,
        columns: &[String],
        delimiter: u8,
        decimal: Decimal,
    ) -> Result<DataFrame> {
        if data.trim().is_empty() {
            debug!("No data rows, creating empty frame with {} columns", columns.len());
            let empty: Vec<Column> = columns
                .iter()
                .map(|name| Column::new_empty(name.as_str().into(), &DataType::String))
                .collect();
            return Ok(DataFrame::new(empty)?);
        }

        let options = CsvReadOptions::default()
            .with_has_header(false)
            .with_infer_schema_length(Some(self.infer_schema_length))
            .map_parse_options(|opts| {
                opts.with_separator(delimiter)
                    .with_decimal_comma(decimal.is_comma())
            });

        let mut cursor = Cursor::new(data.as_bytes());
        let mut df = CsvReader::new(&mut cursor).with_options(options).finish()?;

        // Column count mismatches surface here as polars shape errors
        df.set_column_names(columns.iter().map(String::as_str))?;

        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_with_decimal_comma() {
        let parser = PolarsTableParser::default();
        let df = parser
            .parse_table("2\t0\t0,1\n2\t1\t1,4\n", &names(&["mode", "time/s", "control/V"]), b'\t', Decimal::Comma)
            .unwrap();

        assert_eq!(df.shape(), (2, 3));
        let control = df.column("control/V").unwrap().f64().unwrap();
        assert_eq!(control.get(0), Some(0.1));
        assert_eq!(control.get(1), Some(1.4));
    }

    #[test]
    fn test_names_override_engine_defaults() {
        let parser = PolarsTableParser::default();
        let df = parser
            .parse_table("0,0\n1,1", &names(&["a", "b"]), b',', Decimal::Point)
            .unwrap();

        let columns: Vec<&str> = df.get_column_names().iter().map(|s| s.as_str()).collect();
        assert_eq!(columns, vec!["a", "b"]);
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn test_column_count_mismatch_fails() {
        let parser = PolarsTableParser::default();
        let result = parser.parse_table("0,0,0\n1,1,1", &names(&["a", "b"]), b',', Decimal::Point);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_data_gives_empty_frame() {
        let parser = PolarsTableParser::default();
        let df = parser
            .parse_table("", &names(&["t", "E", "I"]), b'\t', Decimal::Point)
            .unwrap();
        assert_eq!(df.shape(), (0, 3));
    }
}
