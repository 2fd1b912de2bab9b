//! Electrochemistry Converter Library
//!
//! Converts the text exports of potentiostat software into normalized tables
//! whose columns carry canonical names for time (`t`), voltage (`E`/`U`) and
//! current (`I`/`j`), together with a field schema describing every column.
//!
//! Supported sources:
//! - plain CSV files with a single line of column names
//! - BioLogic EC-Lab MPT exports
//! - Gamry Instruments Framework DAT exports
//!
//! ## Usage
//!
//! ```rust
//! use echem_converter::{Device, RawFile, convert};
//!
//! # fn example() -> echem_converter::Result<()> {
//! let text = "EC-Lab ASCII FILE\nNb header lines : 3\ntime/s\tEwe/V\t<I>/mA\n0,5\t0,1\t2,0\n";
//! let conversion = convert(RawFile::new(text), Device::ECLab, None)?;
//! assert_eq!(conversion.column_names(), vec!["t", "E", "I"]);
//! assert_eq!(conversion.fields[0].unit.as_deref(), Some("s"));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod adapter;
pub mod cli;
pub mod config;
pub mod converter;
pub mod error;
pub mod loader;
pub mod models;
pub mod output;
pub mod processor;

pub use adapter::{Adapter, validate_core_dimensions};
pub use config::{ConverterConfig, OutputFormat};
pub use converter::{Conversion, ConvertedFile, convert, convert_file};
pub use error::{ConverterError, Result};
pub use loader::{Loader, RawFile};
pub use models::{ConversionStats, Decimal, Device, Field, HeaderLayout, Metadata};
pub use processor::BatchConverter;
