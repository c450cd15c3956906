//! # pipe-sheets-csv
//!
//! Delimited grid reader and writer for pipe-sheets.
//!
//! Grids are stored one row per line with cells separated by `|`. Cell text
//! is taken verbatim: there is no quoting, so double quotes stay part of the
//! cell. Rows may have different lengths.

mod error;
mod options;
mod reader;
mod writer;

pub use error::{CsvError, CsvResult};
pub use options::{ErrorRendering, GridReadOptions, GridWriteOptions, LineTerminator};
pub use reader::GridReader;
pub use writer::{render_cell, GridWriter};
