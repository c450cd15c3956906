//! Grid calculation engine
//!
//! Evaluates every formula cell of a grid in dependency order, so each
//! evaluation only reaches cells that are already settled and recursion stays
//! shallow even for long reference chains.
//!
//! # Example
//!
//! ```rust
//! use pipe_sheets::prelude::*;
//!
//! let mut grid = Grid::from_rows(vec![
//!     vec!["10".to_string(), "=SUM(A1, 5)".to_string()],
//! ]);
//!
//! let stats = grid.calculate();
//! assert_eq!(stats.cells_calculated, 1);
//! assert_eq!(grid.value(CellAddress::new(0, 1)), Some(Value::number(15)));
//! ```

use crate::{CellAddress, DependencyGraph, Evaluator, EvaluatorOptions, Grid, Value};
use pipe_sheets_core::ErrorKind;
use pipe_sheets_formula::DEFAULT_MAX_DEPTH;
use tracing::{debug, warn};

/// Options for grid calculation
#[derive(Debug, Clone)]
pub struct CalculationOptions {
    /// Recursion bound handed to the evaluator (default: 256)
    pub max_depth: usize,
    /// Discard earlier results and evaluate every formula again
    pub force_full_calculation: bool,
}

impl Default for CalculationOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            force_full_calculation: true,
        }
    }
}

/// Statistics from a calculation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalculationStats {
    /// Total number of formula cells
    pub formula_count: usize,
    /// Number of cells calculated
    pub cells_calculated: usize,
    /// Number of formula cells that ended in an error
    pub errors: usize,
    /// Number of cells that lie on a circular reference
    pub circular_references: usize,
}

/// Extension trait for Grid to add calculation methods
pub trait GridCalculationExt {
    /// Calculate all formulas in the grid with default options
    fn calculate(&mut self) -> CalculationStats;

    /// Calculate all formulas with custom options
    fn calculate_with_options(&mut self, options: &CalculationOptions) -> CalculationStats;
}

impl GridCalculationExt for Grid {
    fn calculate(&mut self) -> CalculationStats {
        self.calculate_with_options(&CalculationOptions::default())
    }

    fn calculate_with_options(&mut self, options: &CalculationOptions) -> CalculationStats {
        if options.force_full_calculation {
            self.reset_formulas();
        }

        let graph = DependencyGraph::from_grid(self);
        let order = graph.evaluation_order();

        let mut stats = CalculationStats {
            formula_count: graph.formula_cells().len(),
            circular_references: graph.circular_cells().len(),
            ..Default::default()
        };

        let mut evaluator = Evaluator::with_options(
            self,
            EvaluatorOptions {
                max_depth: options.max_depth,
            },
        );

        for addr in order {
            let already_settled = evaluator
                .grid()
                .cell(addr)
                .map_or(false, |cell| cell.state().is_settled());

            let value = evaluator.evaluate(addr);
            if !already_settled {
                stats.cells_calculated += 1;
            }
            if let Value::Error(kind) = value {
                stats.errors += 1;
                report_failure(addr, kind);
            }
        }

        debug!(
            formulas = stats.formula_count,
            calculated = stats.cells_calculated,
            errors = stats.errors,
            circular = stats.circular_references,
            "calculation finished"
        );
        stats
    }
}

fn report_failure(addr: CellAddress, kind: ErrorKind) {
    warn!(cell = %addr, error = %kind, "formula evaluated to an error");
}
