//! Formula evaluator
//!
//! Evaluates grid cells on demand. Each formula cell moves through
//! `Unevaluated -> Evaluating -> Evaluated | Failed`; meeting a cell that is
//! still `Evaluating` means the formula depends on itself. Results are
//! memoized in the grid, so every cell is computed at most once.

use crate::ast::{Formula, FormulaExpr};
use crate::cache::{CopySource, FormulaCache};
use crate::functions::FunctionRegistry;
use crate::parser::FormulaParser;
use pipe_sheets_core::{CellAddress, CellState, ErrorKind, Grid, Value};
use std::sync::OnceLock;
use tracing::{debug, trace};

/// Global function registry (lazily initialized)
static FUNCTION_REGISTRY: OnceLock<FunctionRegistry> = OnceLock::new();

/// The shared registry of built-in functions
pub fn function_registry() -> &'static FunctionRegistry {
    FUNCTION_REGISTRY.get_or_init(FunctionRegistry::new)
}

/// Default bound on nested calls, cell hops and copy hops
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Evaluator settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluatorOptions {
    /// Deepest recursion allowed before a term yields `DepthExceeded`
    pub max_depth: usize,
}

impl Default for EvaluatorOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Where a formula is being evaluated
///
/// `origin` is the cell the formula text belongs to; `shift` is how many rows
/// its references move down because it is being reused through `^^`.
#[derive(Debug, Clone, Copy)]
struct Frame {
    origin: CellAddress,
    shift: u32,
}

impl Frame {
    fn at(origin: CellAddress) -> Self {
        Self { origin, shift: 0 }
    }

    /// The cell the formula is evaluated for
    fn target(&self) -> Option<CellAddress> {
        self.origin.offset_rows(self.shift)
    }
}

/// Evaluates cells of one grid
pub struct Evaluator<'a> {
    grid: &'a mut Grid,
    registry: &'a FunctionRegistry,
    options: EvaluatorOptions,
    cache: FormulaCache,
    depth: usize,
}

impl<'a> Evaluator<'a> {
    /// Create an evaluator with default options and the built-in functions
    pub fn new(grid: &'a mut Grid) -> Self {
        Self::with_options(grid, EvaluatorOptions::default())
    }

    /// Create an evaluator with custom options
    pub fn with_options(grid: &'a mut Grid, options: EvaluatorOptions) -> Self {
        Self {
            grid,
            registry: function_registry(),
            options,
            cache: FormulaCache::new(options.max_depth),
            depth: 0,
        }
    }

    /// Use a different function registry
    pub fn with_registry(mut self, registry: &'a FunctionRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// The grid being evaluated
    pub fn grid(&self) -> &Grid {
        &*self.grid
    }

    /// Evaluate a cell, memoizing the result in the grid
    ///
    /// Addresses outside the grid yield `UndefinedCellReference`.
    pub fn evaluate(&mut self, addr: CellAddress) -> Value {
        match self.grid.cell(addr).map(|cell| cell.state()) {
            None => return Value::Error(ErrorKind::UndefinedCellReference),
            Some(CellState::Evaluated(value)) => return value.clone(),
            Some(CellState::Failed(kind)) => return Value::Error(*kind),
            Some(CellState::Evaluating) => {
                debug!(cell = %addr, "circular reference");
                return self.fail(addr, ErrorKind::CircularReference);
            }
            Some(CellState::Unevaluated) => {}
        }

        // A bound hit here says nothing about the cell itself; leave it for
        // a shallower caller.
        if self.depth >= self.options.max_depth {
            return Value::Error(ErrorKind::DepthExceeded);
        }

        let formula = match self.cache.formula(&*self.grid, addr) {
            Ok(formula) => formula,
            Err(kind) => return self.fail(addr, kind),
        };

        let marked = self.grid.mark_evaluating(addr);
        debug_assert!(marked.is_ok(), "{} left the grid", addr);

        let value = self.nested(|this| this.evaluate_body(&formula, addr));

        let settled = self.grid.settle(addr, &value);
        debug_assert!(settled.is_ok(), "{} left the grid", addr);

        trace!(cell = %addr, value = %value, "evaluated");
        value
    }

    /// Evaluate every formula cell in grid order
    ///
    /// Returns the number of formula cells visited.
    pub fn evaluate_all(&mut self) -> usize {
        let cells: Vec<CellAddress> = self.grid.formula_cells().map(|(addr, _)| addr).collect();
        for &addr in &cells {
            self.evaluate(addr);
        }
        debug!(formulas = cells.len(), "evaluated grid");
        cells.len()
    }

    /// Evaluate formula text as if it were written at `at`
    ///
    /// Referenced cells are evaluated and memoized as usual; the result
    /// itself is not stored anywhere.
    pub fn evaluate_formula(&mut self, formula: &str, at: CellAddress) -> Value {
        match FormulaParser::with_max_nesting(self.options.max_depth).parse(formula) {
            Ok(formula) => self.evaluate_body(&formula, at),
            Err(e) => Value::Error(e.kind()),
        }
    }

    /// Evaluate a whole formula written at `at`
    ///
    /// A formula that is exactly `^^` is a copy of the formula above.
    fn evaluate_body(&mut self, formula: &Formula, at: CellAddress) -> Value {
        if formula.is_pure_copy() {
            self.evaluate_copy(at)
        } else {
            self.evaluate_terms(&formula.terms, Frame::at(at))
        }
    }

    /// Evaluate a list of terms, splicing sequences and stopping at the first error
    fn evaluate_terms(&mut self, terms: &[FormulaExpr], frame: Frame) -> Value {
        match self.evaluate_list(terms, frame) {
            Ok(values) => Value::from_values(values),
            Err(error) => error,
        }
    }

    fn evaluate_list(&mut self, terms: &[FormulaExpr], frame: Frame) -> Result<Vec<Value>, Value> {
        let mut values = Vec::with_capacity(terms.len());
        for term in terms {
            let value = self.evaluate_expr(term, frame);
            if value.is_error() {
                return Err(value);
            }
            value.flatten_into(&mut values);
        }
        Ok(values)
    }

    fn evaluate_expr(&mut self, expr: &FormulaExpr, frame: Frame) -> Value {
        match expr {
            FormulaExpr::Number(n) => Value::Number(*n),
            FormulaExpr::Text(s) => Value::Text(s.clone()),
            FormulaExpr::CellRef(addr) => match addr.offset_rows(frame.shift) {
                Some(target) => self.evaluate(target),
                None => Value::Error(ErrorKind::UndefinedCellReference),
            },
            FormulaExpr::OutOfRangeRef(_) => Value::Error(ErrorKind::UndefinedCellReference),
            FormulaExpr::CopyAbove => match frame.target() {
                Some(target) => match target.above() {
                    Some(above) => self.evaluate(above),
                    None => Value::Error(ErrorKind::NoRowAbove),
                },
                None => Value::Error(ErrorKind::UndefinedCellReference),
            },
            FormulaExpr::Function { name, args } => self.evaluate_function(name, args, frame),
        }
    }

    fn evaluate_function(&mut self, name: &str, args: &[FormulaExpr], frame: Frame) -> Value {
        let registry = self.registry;
        let Some(func) = registry.get(name) else {
            return Value::Error(ErrorKind::UnknownFunction);
        };

        self.nested(|this| {
            let values = match this.evaluate_list(args, frame) {
                Ok(values) => values,
                Err(error) => return error,
            };
            match func.call(&values) {
                Ok(value) => value,
                Err(e) => Value::Error(e.kind()),
            }
        })
    }

    /// Reuse the formula above `at` with its references moved down
    fn evaluate_copy(&mut self, at: CellAddress) -> Value {
        let Some(above) = at.above() else {
            return Value::Error(ErrorKind::NoRowAbove);
        };

        match self.cache.copy_source(&*self.grid, above) {
            Err(kind) => Value::Error(kind),
            Ok(CopySource::Literal(cell)) => self.evaluate(cell),
            Ok(CopySource::Formula { cell, shift }) => {
                let formula = match self.cache.formula(&*self.grid, cell) {
                    Ok(formula) => formula,
                    Err(kind) => return Value::Error(kind),
                };
                let frame = Frame {
                    origin: cell,
                    shift,
                };
                self.nested(|this| this.evaluate_terms(&formula.terms, frame))
            }
        }
    }

    /// Run `f` one level deeper, refusing once the bound is reached
    fn nested(&mut self, f: impl FnOnce(&mut Self) -> Value) -> Value {
        if self.depth >= self.options.max_depth {
            return Value::Error(ErrorKind::DepthExceeded);
        }
        self.depth += 1;
        let value = f(self);
        self.depth -= 1;
        value
    }

    fn fail(&mut self, addr: CellAddress, kind: ErrorKind) -> Value {
        let failed = self.grid.fail(addr, kind);
        debug_assert!(failed.is_ok(), "{} left the grid", addr);
        Value::Error(kind)
    }
}

/// Evaluate every formula cell of a grid with default options
pub fn evaluate_grid(grid: &mut Grid) -> usize {
    Evaluator::new(grid).evaluate_all()
}
