//! # pipe-sheets
//!
//! A Rust library for evaluating pipe-delimited formula grids.
//!
//! A grid is a text file with one row per line and cells separated by `|`.
//! Cells starting with `=` hold formulas; everything else is a literal.
//!
//! ## Features
//!
//! - Exact decimal arithmetic
//! - Built-in functions: CONCAT, TEXT, SUM, SPREAD, SPLIT, INCFROM
//! - Cell references (`A1`, `AB12`) and the `^^` copy-from-above marker
//! - Memoized evaluation with circular reference detection
//! - Reading and writing delimited grid files
//!
//! ## Example
//!
//! ```rust
//! use pipe_sheets::prelude::*;
//!
//! let mut grid = GridReader::read_str(
//!     "1|2|=SUM(A1, B1)\n3|4|=^^\n",
//!     &GridReadOptions::default(),
//! )
//! .unwrap();
//!
//! grid.calculate();
//!
//! let text = GridWriter::to_string(&grid, &GridWriteOptions::default()).unwrap();
//! assert_eq!(text, "1|2|3\n3|4|7\n");
//! ```

pub mod calculation;
pub mod prelude;

// Re-export calculation types
pub use calculation::{CalculationOptions, CalculationStats, GridCalculationExt};

// Re-export core types
pub use pipe_sheets_core::{
    parse_decimal,
    // Cell types
    Cell,
    CellAddress,
    CellContent,
    CellState,
    Decimal,
    // Error types
    Error,
    ErrorKind,
    // Main types
    Grid,
    Result,
    Value,
    // Constants
    COPY_MARKER,
    FORMULA_MARKER,
    MAX_COLS,
    MAX_ROWS,
};

// Re-export formula types
pub use pipe_sheets_formula::{
    evaluate_grid, function_registry, parse_formula, split_arguments, DependencyGraph, Evaluator,
    EvaluatorOptions, Formula, FormulaError, FormulaExpr, FormulaParser, FormulaResult,
    FunctionDef, FunctionRegistry, DEFAULT_MAX_DEPTH,
};

// Re-export I/O types
pub use pipe_sheets_csv::{
    CsvError, ErrorRendering, GridReadOptions, GridReader, GridWriteOptions, GridWriter,
    LineTerminator,
};

use std::path::Path;

/// Extension trait for Grid to add file I/O
pub trait GridExt {
    /// Open a grid file with default options
    fn open<P: AsRef<Path>>(path: P) -> Result<Grid>;

    /// Save the grid to a file with default options
    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()>;
}

impl GridExt for Grid {
    fn open<P: AsRef<Path>>(path: P) -> Result<Grid> {
        let path = path.as_ref();
        GridReader::read_file(path, &GridReadOptions::default())
            .map_err(|e| Error::other(format!("{}: {}", path.display(), e)))
    }

    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        GridWriter::write_file(self, path, &GridWriteOptions::default())
            .map_err(|e| Error::other(format!("{}: {}", path.display(), e)))
    }
}
