//! # pipe-sheets-core
//!
//! Core data structures for the pipe-sheets formula engine.
//!
//! This crate provides the fundamental types used throughout pipe-sheets:
//! - [`Value`] and [`ErrorKind`] - Evaluated results (text, exact decimals, sequences, errors)
//! - [`CellAddress`] - Cell addressing (A1 notation ↔ zero-based row/column)
//! - [`Grid`], [`Cell`], [`CellState`] - The cell store and its evaluation state machine
//!
//! ## Example
//!
//! ```rust
//! use pipe_sheets_core::{CellAddress, Grid, Value};
//!
//! let grid = Grid::from_rows(vec![
//!     vec!["2".to_string(), "=SUM(A1, 3)".to_string()],
//! ]);
//!
//! // Literal cells are evaluated as soon as the grid is built
//! let a1 = CellAddress::parse("A1").unwrap();
//! assert_eq!(grid.value(a1), Some(Value::number(2)));
//!
//! // Formula cells wait for the evaluator
//! let b1 = CellAddress::new(0, 1);
//! assert!(grid.cell(b1).unwrap().is_formula());
//! ```

pub mod cell;
pub mod error;
pub mod grid;

// Re-exports for convenience
pub use cell::{parse_decimal, CellAddress, ErrorKind, Value};
pub use error::{Error, Result};
pub use grid::{Cell, CellContent, CellState, Grid};

pub use rust_decimal::Decimal;

/// Character that marks a cell as a formula in the grid source
pub const FORMULA_MARKER: char = '=';

/// Token that copies the formula of the cell directly above
pub const COPY_MARKER: &str = "^^";

/// Maximum number of rows in a grid
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a grid
pub const MAX_COLS: u16 = 16_384;
