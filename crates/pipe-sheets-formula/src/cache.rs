//! Parsed formula cache and `^^` chain resolution
//!
//! A cell's formula text never changes after the grid is built, so each body
//! is parsed at most once. Columns of pure `^^` cells are resolved to the
//! formula they copy in a single pass, so a copy a thousand rows below its
//! source costs one lookup instead of a thousand nested evaluations.

use crate::ast::Formula;
use crate::parser::FormulaParser;
use ahash::AHashMap;
use pipe_sheets_core::{CellAddress, ErrorKind, Grid};
use std::rc::Rc;
use tracing::debug;

/// What a `^^` placed directly below a cell stands for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopySource {
    /// The value of a literal cell
    Literal(CellAddress),
    /// The formula of `cell` with every reference moved down `shift` rows
    Formula { cell: CellAddress, shift: u32 },
}

impl CopySource {
    /// The same source seen from one row further down
    fn deeper(self) -> Result<Self, ErrorKind> {
        match self {
            CopySource::Formula { cell, shift } => Ok(CopySource::Formula {
                cell,
                shift: shift
                    .checked_add(1)
                    .ok_or(ErrorKind::UndefinedCellReference)?,
            }),
            literal => Ok(literal),
        }
    }
}

type Parsed = Result<Rc<Formula>, ErrorKind>;

/// Memoized formula parses and copy sources for one grid
#[derive(Debug, Default)]
pub struct FormulaCache {
    parser: FormulaParser,
    formulas: AHashMap<CellAddress, Parsed>,
    copy_sources: AHashMap<CellAddress, Result<CopySource, ErrorKind>>,
}

impl FormulaCache {
    /// Create a cache whose parser uses the given nesting limit
    pub fn new(max_nesting: usize) -> Self {
        Self {
            parser: FormulaParser::with_max_nesting(max_nesting),
            ..Self::default()
        }
    }

    /// Parsed formula of a cell
    ///
    /// Literal and out-of-grid cells have no formula and report
    /// `UndefinedCellReference`; parse failures report their error kind.
    pub fn formula(&mut self, grid: &Grid, addr: CellAddress) -> Parsed {
        if let Some(parsed) = self.formulas.get(&addr) {
            return parsed.clone();
        }

        let parsed = match grid.cell(addr).and_then(|cell| cell.formula_text()) {
            Some(text) => self.parser.parse(text).map(Rc::new).map_err(|e| {
                debug!(cell = %addr, error = %e, "formula failed to parse");
                e.kind()
            }),
            None => Err(ErrorKind::UndefinedCellReference),
        };

        self.formulas.insert(addr, parsed.clone());
        parsed
    }

    /// Resolve what a `^^` directly below `above` copies
    ///
    /// Pure `^^` cells are walked upwards until a literal or a formula with
    /// real content is found; each hop adds one row of shift.
    pub fn copy_source(&mut self, grid: &Grid, above: CellAddress) -> Result<CopySource, ErrorKind> {
        let mut chain = Vec::new();
        let mut cell = above;

        let mut resolved = loop {
            if let Some(found) = self.copy_sources.get(&cell) {
                break found.clone();
            }

            let is_formula = match grid.cell(cell) {
                Some(c) => c.is_formula(),
                None => break Err(ErrorKind::UndefinedCellReference),
            };
            if !is_formula {
                break Ok(CopySource::Literal(cell));
            }

            match self.formula(grid, cell) {
                Ok(formula) if formula.is_pure_copy() => match cell.above() {
                    Some(next) => {
                        chain.push(cell);
                        cell = next;
                    }
                    None => break Err(ErrorKind::NoRowAbove),
                },
                Ok(_) => break Ok(CopySource::Formula { cell, shift: 1 }),
                Err(kind) => break Err(kind),
            }
        };

        self.copy_sources.insert(cell, resolved.clone());
        while let Some(link) = chain.pop() {
            resolved = resolved.and_then(CopySource::deeper);
            self.copy_sources.insert(link, resolved.clone());
        }

        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn grid(data: &[&[&str]]) -> Grid {
        Grid::from_rows(
            data.iter()
                .map(|row| row.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_formula_is_parsed_once() {
        let g = grid(&[&["=SUM(1,2)"]]);
        let mut cache = FormulaCache::default();
        let a1 = CellAddress::new(0, 0);
        let first = cache.formula(&g, a1).unwrap();
        let second = cache.formula(&g, a1).unwrap();
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_formula_errors() {
        let g = grid(&[&["=SUM(1", "5"]]);
        let mut cache = FormulaCache::default();
        assert_eq!(
            cache.formula(&g, CellAddress::new(0, 0)),
            Err(ErrorKind::Malformed)
        );
        assert_eq!(
            cache.formula(&g, CellAddress::new(0, 1)),
            Err(ErrorKind::UndefinedCellReference)
        );
    }

    #[test]
    fn test_copy_source_walks_pure_copies() {
        let g = grid(&[&["=SUM(A1)"], &["=^^"], &["=^^"], &["=^^"]]);
        let mut cache = FormulaCache::default();

        assert_eq!(
            cache.copy_source(&g, CellAddress::new(2, 0)),
            Ok(CopySource::Formula {
                cell: CellAddress::new(0, 0),
                shift: 3
            })
        );
        // Cached links along the chain
        assert_eq!(
            cache.copy_source(&g, CellAddress::new(1, 0)),
            Ok(CopySource::Formula {
                cell: CellAddress::new(0, 0),
                shift: 2
            })
        );
        assert_eq!(
            cache.copy_source(&g, CellAddress::new(0, 0)),
            Ok(CopySource::Formula {
                cell: CellAddress::new(0, 0),
                shift: 1
            })
        );
    }

    #[test]
    fn test_copy_source_literal_and_top_row() {
        let g = grid(&[&["7", "=^^"], &["=^^", "=^^"]]);
        let mut cache = FormulaCache::default();
        assert_eq!(
            cache.copy_source(&g, CellAddress::new(0, 0)),
            Ok(CopySource::Literal(CellAddress::new(0, 0)))
        );
        assert_eq!(
            cache.copy_source(&g, CellAddress::new(0, 1)),
            Err(ErrorKind::NoRowAbove)
        );
    }

    #[test]
    fn test_copy_source_short_row() {
        let g = grid(&[&["1"], &["2", "=^^"]]);
        let mut cache = FormulaCache::default();
        assert_eq!(
            cache.copy_source(&g, CellAddress::new(0, 1)),
            Err(ErrorKind::UndefinedCellReference)
        );
    }
}
