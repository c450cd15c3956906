//! Formula Abstract Syntax Tree types

use pipe_sheets_core::{CellAddress, COPY_MARKER};
use rust_decimal::Decimal;
use std::fmt;

/// Formula expression AST
///
/// A formula body is a comma-separated list of these terms.
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaExpr {
    // === Literals ===
    /// Numeric literal
    Number(Decimal),
    /// String literal
    Text(String),

    // === References ===
    /// Single cell reference
    CellRef(CellAddress),
    /// Reference syntax naming a coordinate no grid can hold (`A0`, `XFE1`)
    OutOfRangeRef(String),
    /// `^^`: the cell directly above
    ///
    /// A formula that is exactly `^^` reuses the formula above with its
    /// references shifted down a row; anywhere else it reads the value above.
    CopyAbove,

    // === Function call ===
    Function {
        name: String,
        args: Vec<FormulaExpr>,
    },
}

impl FormulaExpr {
    /// Check if this term is the formula-copy marker
    pub fn is_copy_marker(&self) -> bool {
        matches!(self, FormulaExpr::CopyAbove)
    }
}

impl fmt::Display for FormulaExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaExpr::Number(n) => write!(f, "{}", n),
            FormulaExpr::Text(s) => write!(f, "\"{}\"", s),
            FormulaExpr::CellRef(addr) => write!(f, "{}", addr),
            FormulaExpr::OutOfRangeRef(text) => f.write_str(text),
            FormulaExpr::CopyAbove => f.write_str(COPY_MARKER),
            FormulaExpr::Function { name, args } => {
                write!(f, "{}(", name)?;
                write_terms(f, args)?;
                f.write_str(")")
            }
        }
    }
}

/// Write terms separated by commas
pub(crate) fn write_terms(f: &mut fmt::Formatter<'_>, terms: &[FormulaExpr]) -> fmt::Result {
    for (i, term) in terms.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{}", term)?;
    }
    Ok(())
}

/// A parsed formula body: its top-level terms
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Formula {
    pub terms: Vec<FormulaExpr>,
}

impl Formula {
    /// Create a formula from its terms
    pub fn new(terms: Vec<FormulaExpr>) -> Self {
        Self { terms }
    }

    /// Whether the whole formula is just `^^`
    pub fn is_pure_copy(&self) -> bool {
        matches!(self.terms.as_slice(), [FormulaExpr::CopyAbove])
    }

    /// Names of every function called, outermost first
    pub fn function_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        let mut pending: Vec<&FormulaExpr> = self.terms.iter().rev().collect();
        while let Some(expr) = pending.pop() {
            if let FormulaExpr::Function { name, args } = expr {
                names.push(name.as_str());
                pending.extend(args.iter().rev());
            }
        }
        names
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_terms(f, &self.terms)
    }
}
