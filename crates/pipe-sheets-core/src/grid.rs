//! Grid of cells
//!
//! The grid is an ordered list of rows, each an ordered list of cells. Rows
//! may have different lengths, mirroring free-form delimited input. Cells are
//! created once when the grid is built; afterwards only their evaluation state
//! changes, through the transition methods on [`Grid`].

use crate::cell::{CellAddress, ErrorKind, Value};
use crate::error::{Error, Result};
use crate::FORMULA_MARKER;

/// Raw source of a cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellContent {
    /// Literal text, kept verbatim
    Literal(String),
    /// Formula body with the formula marker stripped
    Formula(String),
}

/// Evaluation state of a cell
///
/// The value only exists once the cell is `Evaluated` or `Failed`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellState {
    /// Formula not evaluated yet
    #[default]
    Unevaluated,
    /// Formula evaluation in progress (seeing this again means a cycle)
    Evaluating,
    /// Evaluation finished with a value
    Evaluated(Value),
    /// Evaluation finished with an error
    Failed(ErrorKind),
}

impl CellState {
    /// Whether the cell has a memoized result
    pub fn is_settled(&self) -> bool {
        matches!(self, CellState::Evaluated(_) | CellState::Failed(_))
    }
}

/// A single cell: raw source plus evaluation state
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    content: CellContent,
    state: CellState,
}

impl Cell {
    /// Create a literal cell; literals are evaluated immediately
    pub fn literal<S: Into<String>>(raw: S) -> Self {
        let raw = raw.into();
        let value = Value::from_literal(&raw);
        Self {
            content: CellContent::Literal(raw),
            state: CellState::Evaluated(value),
        }
    }

    /// Create a formula cell from its body (without the marker)
    pub fn formula<S: Into<String>>(body: S) -> Self {
        Self {
            content: CellContent::Formula(body.into()),
            state: CellState::Unevaluated,
        }
    }

    /// Classify raw cell text: a leading `marker` makes it a formula
    pub fn from_raw(raw: &str, marker: char) -> Self {
        match raw.strip_prefix(marker) {
            Some(body) => Self::formula(body),
            None => Self::literal(raw),
        }
    }

    /// Get the raw content
    pub fn content(&self) -> &CellContent {
        &self.content
    }

    /// Get the raw source text (formula body without the marker)
    pub fn source(&self) -> &str {
        match &self.content {
            CellContent::Literal(s) | CellContent::Formula(s) => s,
        }
    }

    /// Check if the cell holds a formula
    pub fn is_formula(&self) -> bool {
        matches!(self.content, CellContent::Formula(_))
    }

    /// Get the formula body if this is a formula cell
    pub fn formula_text(&self) -> Option<&str> {
        match &self.content {
            CellContent::Formula(s) => Some(s),
            CellContent::Literal(_) => None,
        }
    }

    /// Get the evaluation state
    pub fn state(&self) -> &CellState {
        &self.state
    }

    /// Get the memoized result, if the cell is settled
    pub fn value(&self) -> Option<Value> {
        match &self.state {
            CellState::Evaluated(v) => Some(v.clone()),
            CellState::Failed(e) => Some(Value::Error(*e)),
            CellState::Unevaluated | CellState::Evaluating => None,
        }
    }
}

/// Two-dimensional cell store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    /// Create an empty grid
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a grid from raw cell text, using `=` as the formula marker
    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        Self::from_rows_with_marker(rows, FORMULA_MARKER)
    }

    /// Build a grid from raw cell text with a custom formula marker
    pub fn from_rows_with_marker(rows: Vec<Vec<String>>, marker: char) -> Self {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|raw| Cell::from_raw(raw, marker)).collect())
            .collect();
        Self { rows }
    }

    /// Append a row of cells
    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of cells in a row (0 for rows past the end)
    pub fn row_len(&self, row: u32) -> usize {
        self.rows.get(row as usize).map_or(0, Vec::len)
    }

    /// Get the rows
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Check if an address lies inside the grid
    pub fn contains(&self, addr: CellAddress) -> bool {
        self.cell(addr).is_some()
    }

    /// Get a cell by address
    pub fn cell(&self, addr: CellAddress) -> Option<&Cell> {
        self.rows
            .get(addr.row as usize)
            .and_then(|row| row.get(addr.col as usize))
    }

    /// Get the memoized value of a cell
    pub fn value(&self, addr: CellAddress) -> Option<Value> {
        self.cell(addr).and_then(Cell::value)
    }

    /// Iterate over all cells with their addresses, row by row
    pub fn cells(&self) -> impl Iterator<Item = (CellAddress, &Cell)> + '_ {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .map(move |(c, cell)| (CellAddress::new(r as u32, c as u16), cell))
        })
    }

    /// Iterate over formula cells (address and body), row by row
    pub fn formula_cells(&self) -> impl Iterator<Item = (CellAddress, &str)> + '_ {
        self.cells()
            .filter_map(|(addr, cell)| cell.formula_text().map(|text| (addr, text)))
    }

    /// Mark a formula cell as being evaluated
    pub fn mark_evaluating(&mut self, addr: CellAddress) -> Result<()> {
        self.cell_mut(addr)?.state = CellState::Evaluating;
        Ok(())
    }

    /// Record a cell's final result: errors become `Failed`, anything else `Evaluated`
    pub fn settle(&mut self, addr: CellAddress, value: &Value) -> Result<()> {
        let state = match value {
            Value::Error(e) => CellState::Failed(*e),
            other => CellState::Evaluated(other.clone()),
        };
        self.cell_mut(addr)?.state = state;
        Ok(())
    }

    /// Mark a cell as failed
    pub fn fail(&mut self, addr: CellAddress, kind: ErrorKind) -> Result<()> {
        self.cell_mut(addr)?.state = CellState::Failed(kind);
        Ok(())
    }

    /// Return every formula cell to `Unevaluated`
    pub fn reset_formulas(&mut self) {
        for cell in self.rows.iter_mut().flatten() {
            if cell.is_formula() {
                cell.state = CellState::Unevaluated;
            }
        }
    }

    fn cell_mut(&mut self, addr: CellAddress) -> Result<&mut Cell> {
        self.rows
            .get_mut(addr.row as usize)
            .and_then(|row| row.get_mut(addr.col as usize))
            .ok_or_else(|| Error::CellOutOfGrid(addr.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|row| row.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_from_rows_classifies_cells() {
        let grid = Grid::from_rows(rows(&[&["1", "=SUM(A1)", ""], &["\"x\""]]));

        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.row_len(0), 3);
        assert_eq!(grid.row_len(1), 1);
        assert_eq!(grid.row_len(5), 0);

        let b1 = grid.cell(CellAddress::new(0, 1)).unwrap();
        assert!(b1.is_formula());
        assert_eq!(b1.source(), "SUM(A1)");
        assert_eq!(b1.state(), &CellState::Unevaluated);
        assert_eq!(b1.value(), None);

        assert_eq!(grid.value(CellAddress::new(0, 0)), Some(Value::number(1)));
        assert_eq!(grid.value(CellAddress::new(0, 2)), Some(Value::empty()));
        assert_eq!(grid.value(CellAddress::new(1, 0)), Some(Value::text("x")));
    }

    #[test]
    fn test_ragged_rows_bounds() {
        let grid = Grid::from_rows(rows(&[&["a", "b"], &["c"]]));
        assert!(grid.contains(CellAddress::new(0, 1)));
        assert!(!grid.contains(CellAddress::new(1, 1)));
        assert!(!grid.contains(CellAddress::new(2, 0)));
    }

    #[test]
    fn test_state_transitions() {
        let mut grid = Grid::from_rows(rows(&[&["=1", "=2"]]));
        let a1 = CellAddress::new(0, 0);
        let b1 = CellAddress::new(0, 1);

        grid.mark_evaluating(a1).unwrap();
        assert_eq!(grid.cell(a1).unwrap().state(), &CellState::Evaluating);

        grid.settle(a1, &Value::number(1)).unwrap();
        assert_eq!(grid.value(a1), Some(Value::number(1)));

        grid.settle(b1, &Value::Error(ErrorKind::Malformed)).unwrap();
        assert_eq!(
            grid.cell(b1).unwrap().state(),
            &CellState::Failed(ErrorKind::Malformed)
        );

        grid.reset_formulas();
        assert_eq!(grid.cell(a1).unwrap().state(), &CellState::Unevaluated);
        assert!(grid.fail(CellAddress::new(3, 3), ErrorKind::Malformed).is_err());
    }

    #[test]
    fn test_formula_cells_iteration_order() {
        let grid = Grid::from_rows(rows(&[&["=1", "x"], &["y", "=2"]]));
        let formulas: Vec<_> = grid.formula_cells().collect();
        assert_eq!(
            formulas,
            vec![(CellAddress::new(0, 0), "1"), (CellAddress::new(1, 1), "2")]
        );
    }
}
