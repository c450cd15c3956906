//! Cell-related types and utilities
//!
//! This module contains:
//! - [`Value`] - The evaluated result of a cell or formula term
//! - [`ErrorKind`] - The error sentinels a formula can produce
//! - [`CellAddress`] - A cell's location (e.g., "A1")

mod address;
mod value;

pub use address::CellAddress;
pub use value::{parse_decimal, ErrorKind, Value};
