//! Loader tests
//!
//! Shared fixtures for the per-device loader tests.


use super::{Loader, RawFile, TableParser};
use crate::error::Result;
use crate::models::{Decimal, Device};
use polars::prelude::DataFrame;
use std::sync::{Arc, Mutex};

pub const ECLAB_MPT: &str = "EC-Lab ASCII FILE
Nb header lines : 6

Device metadata : some metadata

mode\ttime/s\tEwe/V\t<I>/mA\tcontrol/V
2\t0\t0,1\t0\t0
2\t1\t1,4\t5\t1
";

pub const GAMRY_DAT: &str = "EXPLAIN
TAG\tCV
TITLE\tLABEL\tCyclic Voltammetry\tTest &Identifier
CURVE\tTABLE\t3597
\tPt\tT\tVf\tIm\tVu\tSig\tAch\tIERange\tOver\tCycle\tTemp
\t#\ts\tV vs. Ref.\tA\tV\tV\tV\t#\tbits\t#\tdeg C
\t0\t0,06\t2,00054E-001\t1,72821E-005\t0,00000E+000\t2,00000E-001\t6,45222E-004\t9\t..........a\t0\t-327,75
\t1\t0,12\t1,97170E-001\t1,04547E-005\t0,00000E+000\t1,97000E-001\t-1,17889E-003\t9\t..........a\t0\t-327,75
";

pub fn loader(device: Device, text: &str) -> Loader {
    Loader::create(device, RawFile::new(text))
}

pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}

/// Arguments a loader passed to its table parser
#[derive(Debug, Clone, PartialEq)]
pub struct ParseCall {
    pub data: String,
    pub columns: Vec<String>,
    pub delimiter: u8,
    pub decimal: Decimal,
}

/// Table parser that records its input instead of parsing
#[derive(Debug, Default, Clone)]
pub struct RecordingParser {
    pub calls: Arc<Mutex<Vec<ParseCall>>>,
}

impl TableParser for RecordingParser {
    fn parse_table(
        &self,
        data: &str,
        columns: &[String],
        delimiter: u8,
        decimal: Decimal,
    ) -> Result<DataFrame> {
        self.calls.lock().unwrap().push(ParseCall {
            data: data.to_string(),
            columns: columns.to_vec(),
            delimiter,
            decimal,
        });
        Ok(DataFrame::empty())
    }
}
