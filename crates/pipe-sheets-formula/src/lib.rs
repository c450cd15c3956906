//! # pipe-sheets-formula
//!
//! Formula parser and evaluator for pipe-sheets.
//!
//! This crate provides:
//! - Argument scanning and formula parsing (text → AST)
//! - Cell evaluation with memoization, cycle detection and `^^` formula copies
//! - The built-in functions (CONCAT, TEXT, SUM, SPREAD, SPLIT, INCFROM)
//! - Dependency tracking for calculation order
//!
//! ## Example
//!
//! ```rust
//! use pipe_sheets_core::{CellAddress, Grid, Value};
//! use pipe_sheets_formula::Evaluator;
//!
//! let mut grid = Grid::from_rows(vec![
//!     vec!["2".to_string(), "3".to_string(), "=SUM(A1, B1)".to_string()],
//! ]);
//!
//! let mut evaluator = Evaluator::new(&mut grid);
//! assert_eq!(evaluator.evaluate(CellAddress::new(0, 2)), Value::number(5));
//! ```

pub mod ast;
pub mod cache;
pub mod dependency;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod parser;
pub mod scanner;

pub use ast::{Formula, FormulaExpr};
pub use dependency::DependencyGraph;
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{
    evaluate_grid, function_registry, Evaluator, EvaluatorOptions, DEFAULT_MAX_DEPTH,
};
pub use functions::{FunctionDef, FunctionRegistry};
pub use parser::{parse_formula, FormulaParser};
pub use scanner::split_arguments;
