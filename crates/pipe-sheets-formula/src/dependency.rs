//! Dependency tracking for formula calculation

use crate::ast::FormulaExpr;
use crate::cache::{CopySource, FormulaCache};
use ahash::{AHashMap, AHashSet};
use pipe_sheets_core::{CellAddress, Grid};
use std::collections::VecDeque;
use tracing::debug;

/// Dependency graph for formula cells
///
/// Tracks which cells depend on which other cells, so formulas can be
/// evaluated after everything they read.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// Cell → Cells that depend on it (dependents)
    dependents: AHashMap<CellAddress, AHashSet<CellAddress>>,
    /// Cell → Cells it depends on (precedents)
    precedents: AHashMap<CellAddress, AHashSet<CellAddress>>,
    /// Formula cells in grid order
    formulas: Vec<CellAddress>,
}

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph for every formula cell of a grid
    ///
    /// A cell that is exactly `^^` depends on what the formula it copies
    /// reads, with the same row shift the evaluator applies. A `^^` inside a
    /// larger formula depends on the cell above. Formulas that fail to parse
    /// contribute no edges; references outside the grid are skipped.
    pub fn from_grid(grid: &Grid) -> Self {
        let mut graph = Self::new();
        let mut cache = FormulaCache::default();

        for (addr, _) in grid.formula_cells() {
            graph.formulas.push(addr);

            let Ok(formula) = cache.formula(grid, addr) else {
                continue;
            };
            let mut refs = Vec::new();
            if formula.is_pure_copy() {
                copy_references(addr, grid, &mut cache, &mut refs);
            } else {
                collect_references(&formula.terms, addr, 0, grid, &mut refs);
            }
            for precedent in refs {
                graph.add_dependency(precedent, addr);
            }
        }

        debug!(
            formulas = graph.formulas.len(),
            edges = graph.edge_count(),
            "built dependency graph"
        );
        graph
    }

    /// Add a dependency: dependent depends on precedent
    pub fn add_dependency(&mut self, precedent: CellAddress, dependent: CellAddress) {
        self.dependents
            .entry(precedent)
            .or_default()
            .insert(dependent);
        self.precedents
            .entry(dependent)
            .or_default()
            .insert(precedent);
    }

    /// Get cells that depend on the given cell
    pub fn dependents(&self, cell: CellAddress) -> impl Iterator<Item = CellAddress> + '_ {
        self.dependents
            .get(&cell)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Get cells that the given cell depends on
    pub fn precedents(&self, cell: CellAddress) -> impl Iterator<Item = CellAddress> + '_ {
        self.precedents
            .get(&cell)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Formula cells in grid order
    pub fn formula_cells(&self) -> &[CellAddress] {
        &self.formulas
    }

    /// Number of precedent → dependent edges
    pub fn edge_count(&self) -> usize {
        self.precedents.values().map(|set| set.len()).sum()
    }

    /// Check whether a cell can reach itself through its precedents
    pub fn has_circular_reference(&self, cell: CellAddress) -> bool {
        let mut visited = AHashSet::new();
        let mut stack: Vec<CellAddress> = self.precedents(cell).collect();

        while let Some(next) = stack.pop() {
            if next == cell {
                return true;
            }
            if visited.insert(next) {
                stack.extend(self.precedents(next));
            }
        }

        false
    }

    /// Formula cells in an order where every precedent comes first
    ///
    /// Kahn's algorithm over formula cells, ties broken by grid order. Cells
    /// that sit on a cycle, or depend on one, cannot be ordered and are
    /// appended at the end in grid order.
    pub fn evaluation_order(&self) -> Vec<CellAddress> {
        let formula_set: AHashSet<CellAddress> = self.formulas.iter().copied().collect();

        let mut in_degree: AHashMap<CellAddress, usize> = self
            .formulas
            .iter()
            .map(|&cell| {
                let count = self
                    .precedents(cell)
                    .filter(|p| formula_set.contains(p))
                    .count();
                (cell, count)
            })
            .collect();

        let mut queue: VecDeque<CellAddress> = self
            .formulas
            .iter()
            .copied()
            .filter(|cell| in_degree.get(cell) == Some(&0))
            .collect();

        let mut order = Vec::with_capacity(self.formulas.len());
        let mut placed = AHashSet::with_capacity(self.formulas.len());

        while let Some(cell) = queue.pop_front() {
            order.push(cell);
            placed.insert(cell);

            let mut ready: Vec<CellAddress> = Vec::new();
            for dependent in self.dependents(cell) {
                if let Some(degree) = in_degree.get_mut(&dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push(dependent);
                    }
                }
            }
            ready.sort_unstable();
            queue.extend(ready);
        }

        if order.len() < self.formulas.len() {
            debug!(
                unordered = self.formulas.len() - order.len(),
                "cells on or behind a cycle"
            );
            order.extend(self.formulas.iter().filter(|cell| !placed.contains(*cell)));
        }

        order
    }

    /// Formula cells that lie on a cycle, in grid order
    pub fn circular_cells(&self) -> Vec<CellAddress> {
        self.formulas
            .iter()
            .copied()
            .filter(|&cell| self.has_circular_reference(cell))
            .collect()
    }
}

/// Gather the cells read by `terms` when evaluated for `origin` with `shift`
fn collect_references(
    terms: &[FormulaExpr],
    origin: CellAddress,
    shift: u32,
    grid: &Grid,
    out: &mut Vec<CellAddress>,
) {
    for term in terms {
        let target = match term {
            FormulaExpr::CellRef(addr) => addr.offset_rows(shift),
            FormulaExpr::CopyAbove => origin.offset_rows(shift).and_then(|cell| cell.above()),
            FormulaExpr::Function { args, .. } => {
                collect_references(args, origin, shift, grid, out);
                continue;
            }
            FormulaExpr::Number(_) | FormulaExpr::Text(_) | FormulaExpr::OutOfRangeRef(_) => {
                continue
            }
        };
        if let Some(target) = target.filter(|t| grid.contains(*t)) {
            out.push(target);
        }
    }
}

/// Gather the cells read by a cell that is exactly `^^`
fn copy_references(
    addr: CellAddress,
    grid: &Grid,
    cache: &mut FormulaCache,
    out: &mut Vec<CellAddress>,
) {
    let Some(above) = addr.above() else {
        return;
    };
    match cache.copy_source(grid, above) {
        Ok(CopySource::Literal(cell)) => out.push(cell),
        Ok(CopySource::Formula { cell, shift }) => {
            if let Ok(formula) = cache.formula(grid, cell) {
                collect_references(&formula.terms, cell, shift, grid, out);
            }
        }
        Err(_) => {}
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

    fn addr(a1: &str) -> CellAddress {
        CellAddress::parse(a1).unwrap()
    }

    fn sorted(cells: impl Iterator<Item = CellAddress>) -> Vec<CellAddress> {
        let mut cells: Vec<_> = cells.collect();
        cells.sort();
        cells
    }

    #[test]
    fn test_add_dependency() {
        let mut graph = DependencyGraph::new();

        let a1 = addr("A1");
        let b1 = addr("B1");

        graph.add_dependency(a1, b1);

        assert!(graph.dependents(a1).any(|c| c == b1));
        assert!(graph.precedents(b1).any(|c| c == a1));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_from_grid_records_references() {
        let g = grid(&[&["1", "2", "=SUM(A1, B1, Z9)"], &["=CONCAT(TEXT(C1))"]]);
        let graph = DependencyGraph::from_grid(&g);

        assert_eq!(graph.formula_cells(), &[addr("C1"), addr("A2")]);
        assert_eq!(sorted(graph.precedents(addr("C1"))), vec![addr("A1"), addr("B1")]);
        assert_eq!(sorted(graph.precedents(addr("A2"))), vec![addr("C1")]);
    }

    #[test]
    fn test_from_grid_follows_copies() {
        let g = grid(&[
            &["1", "=A1"],
            &["2", "=^^"],
            &["3", "=^^"],
            &["\"x\"", "=CONCAT(^^)"],
        ]);
        let graph = DependencyGraph::from_grid(&g);

        assert_eq!(sorted(graph.precedents(addr("B2"))), vec![addr("A2")]);
        assert_eq!(sorted(graph.precedents(addr("B3"))), vec![addr("A3")]);
        // ^^ inside a larger formula reads the cell above
        assert_eq!(sorted(graph.precedents(addr("B4"))), vec![addr("B3")]);
        assert_eq!(sorted(graph.dependents(addr("B3"))), vec![addr("B4")]);
    }

    #[test]
    fn test_malformed_formula_has_no_edges() {
        let g = grid(&[&["1", "=SUM(A1"]]);
        let graph = DependencyGraph::from_grid(&g);
        assert_eq!(graph.formula_cells(), &[addr("B1")]);
        assert_eq!(graph.precedents(addr("B1")).count(), 0);
    }

    #[test]
    fn test_evaluation_order_puts_precedents_first() {
        let g = grid(&[&["=B1", "=C1", "=D1", "4"], &["=A1", "=SUM(A2, B1)"]]);
        let graph = DependencyGraph::from_grid(&g);
        let order = graph.evaluation_order();

        assert_eq!(order.len(), 5);
        let position = |cell: &str| order.iter().position(|c| *c == addr(cell)).unwrap();
        assert!(position("C1") < position("B1"));
        assert!(position("B1") < position("A1"));
        assert!(position("A1") < position("A2"));
        assert!(position("A2") < position("B2"));
        assert_eq!(order[0], addr("C1"));
    }

    #[test]
    fn test_cycles_are_appended_last() {
        let g = grid(&[&["=B1", "=A1", "=A1", "=1"]]);
        let graph = DependencyGraph::from_grid(&g);

        assert_eq!(
            graph.evaluation_order(),
            vec![addr("D1"), addr("A1"), addr("B1"), addr("C1")]
        );
        assert!(graph.has_circular_reference(addr("A1")));
        assert!(graph.has_circular_reference(addr("B1")));
        assert!(!graph.has_circular_reference(addr("C1")));
        assert_eq!(graph.circular_cells(), vec![addr("A1"), addr("B1")]);
    }

    #[test]
    fn test_self_reference_is_circular() {
        let g = grid(&[&["=SUM(A1)"]]);
        let graph = DependencyGraph::from_grid(&g);
        assert!(graph.has_circular_reference(addr("A1")));
    }

    #[test]
    fn test_long_chain_order() {
        let mut rows: Vec<Vec<String>> = (2..=5000).map(|n| vec![format!("=A{}", n)]).collect();
        rows.push(vec!["0".to_string()]);
        let graph = DependencyGraph::from_grid(&Grid::from_rows(rows));

        let order = graph.evaluation_order();
        assert_eq!(order.len(), 4999);
        assert_eq!(order[0], CellAddress::new(4998, 0));
        assert_eq!(order[4998], CellAddress::new(0, 0));
        assert!(!graph.has_circular_reference(CellAddress::new(0, 0)));
    }
}
