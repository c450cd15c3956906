//! Formula parser
//!
//! A recursive descent parser for formula bodies. A body is a comma-separated
//! list of terms; each term is a number, a string literal, a cell reference,
//! the `^^` copy marker, or a function call whose arguments are terms again.

use crate::ast::{Formula, FormulaExpr};
use crate::error::{FormulaError, FormulaResult};
use crate::scanner::split_arguments;
use pipe_sheets_core::{parse_decimal, CellAddress, COPY_MARKER, FORMULA_MARKER};

/// Default limit on nested function calls
pub const DEFAULT_MAX_NESTING: usize = 256;

/// Parse a formula body into its terms
///
/// A leading `=` is accepted and ignored, so both the raw cell text and the
/// stored body parse the same way.
///
/// # Example
/// ```rust
/// use pipe_sheets_formula::parse_formula;
///
/// let formula = parse_formula("=SUM(A1, 2), \"x\"").unwrap();
/// assert_eq!(formula.terms.len(), 2);
/// assert_eq!(formula.to_string(), "SUM(A1,2),\"x\"");
///
/// assert!(parse_formula("SUM(1,,2)").is_err());
/// ```
pub fn parse_formula(formula: &str) -> FormulaResult<Formula> {
    FormulaParser::new().parse(formula)
}

/// Formula parser with a configurable nesting limit
#[derive(Debug, Clone)]
pub struct FormulaParser {
    max_nesting: usize,
}

impl Default for FormulaParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FormulaParser {
    /// Create a parser with the default nesting limit
    pub fn new() -> Self {
        Self::with_max_nesting(DEFAULT_MAX_NESTING)
    }

    /// Create a parser that rejects calls nested deeper than `max_nesting`
    pub fn with_max_nesting(max_nesting: usize) -> Self {
        Self { max_nesting }
    }

    /// Parse a formula body
    pub fn parse(&self, formula: &str) -> FormulaResult<Formula> {
        let body = formula.strip_prefix(FORMULA_MARKER).unwrap_or(formula);
        Ok(Formula::new(self.parse_terms(body, 0)?))
    }

    fn parse_terms(&self, text: &str, depth: usize) -> FormulaResult<Vec<FormulaExpr>> {
        if depth > self.max_nesting {
            return Err(FormulaError::NestingTooDeep(self.max_nesting));
        }

        split_arguments(text)?
            .iter()
            .map(|term| self.parse_term(term, depth))
            .collect()
    }

    /// Parse one term; the scanner already removed whitespace outside strings
    fn parse_term(&self, term: &str, depth: usize) -> FormulaResult<FormulaExpr> {
        if term == COPY_MARKER {
            return Ok(FormulaExpr::CopyAbove);
        }

        if term.starts_with('"') {
            return parse_string(term);
        }

        if let Some(n) = parse_decimal(term) {
            return Ok(FormulaExpr::Number(n));
        }

        if let Some(open) = term.find('(') {
            return self.parse_call(term, open, depth);
        }

        if is_cell_reference(term) {
            return Ok(match CellAddress::parse(term) {
                Ok(addr) => FormulaExpr::CellRef(addr),
                Err(_) => FormulaExpr::OutOfRangeRef(term.to_string()),
            });
        }

        Err(FormulaError::Parse(format!("Unexpected term '{}'", term)))
    }

    fn parse_call(&self, term: &str, open: usize, depth: usize) -> FormulaResult<FormulaExpr> {
        let name = &term[..open];
        if !is_function_name(name) {
            return Err(FormulaError::Parse(format!(
                "Invalid function name '{}'",
                name
            )));
        }

        let inner = term[open + 1..]
            .strip_suffix(')')
            .ok_or_else(|| FormulaError::Parse(format!("Expected ')' at end of '{}'", term)))?;

        // Anything after the matching ')' shows up here as an unbalanced ')'
        let args = self.parse_terms(inner, depth + 1)?;

        Ok(FormulaExpr::Function {
            name: name.to_ascii_uppercase(),
            args,
        })
    }
}

fn parse_string(term: &str) -> FormulaResult<FormulaExpr> {
    let inner = term
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or_else(|| FormulaError::Parse(format!("Unterminated string literal {}", term)))?;

    if inner.contains('"') {
        return Err(FormulaError::Parse(format!(
            "Unexpected characters after string literal in {}",
            term
        )));
    }

    Ok(FormulaExpr::Text(inner.to_string()))
}

/// Uppercase column letters followed by row digits
fn is_cell_reference(term: &str) -> bool {
    let letters = term.bytes().take_while(u8::is_ascii_uppercase).count();
    let digits = &term[letters..];
    letters > 0 && !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn is_function_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use pretty_assertions::assert_eq;

    fn terms(formula: &str) -> Vec<FormulaExpr> {
        parse_formula(formula).unwrap().terms
    }

    fn call(name: &str, args: Vec<FormulaExpr>) -> FormulaExpr {
        FormulaExpr::Function {
            name: name.to_string(),
            args,
        }
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(terms("42"), vec![FormulaExpr::Number(Decimal::from(42))]);
        assert_eq!(
            terms("-3.25"),
            vec![FormulaExpr::Number(Decimal::new(-325, 2))]
        );
    }

    #[test]
    fn test_parse_string() {
        assert_eq!(terms("\"hello\""), vec![FormulaExpr::Text("hello".into())]);
        assert_eq!(terms("\"\""), vec![FormulaExpr::Text(String::new())]);
        assert_eq!(terms("\"a b\""), vec![FormulaExpr::Text("a b".into())]);
    }

    #[test]
    fn test_parse_cell_reference() {
        assert_eq!(
            terms("A1"),
            vec![FormulaExpr::CellRef(CellAddress::new(0, 0))]
        );
        assert_eq!(
            terms("AB12"),
            vec![FormulaExpr::CellRef(CellAddress::new(11, 27))]
        );
    }

    #[test]
    fn test_parse_reference_out_of_range() {
        for text in ["A0", "A2000000", "XFE1", "A99999999999"] {
            assert_eq!(
                terms(text),
                vec![FormulaExpr::OutOfRangeRef(text.to_string())],
                "{}",
                text
            );
        }
        assert_eq!(
            terms("XFD1048576"),
            vec![FormulaExpr::CellRef(CellAddress::new(1_048_575, 16_383))]
        );
    }

    #[test]
    fn test_parse_function_call() {
        assert_eq!(
            terms("sum(1, A2)"),
            vec![call(
                "SUM",
                vec![
                    FormulaExpr::Number(Decimal::from(1)),
                    FormulaExpr::CellRef(CellAddress::new(1, 0)),
                ]
            )]
        );
        assert_eq!(terms("CONCAT()"), vec![call("CONCAT", vec![])]);
    }

    #[test]
    fn test_parse_nested_calls() {
        assert_eq!(
            terms("CONCAT(TEXT(SUM(1,2)),\"x\")"),
            vec![call(
                "CONCAT",
                vec![
                    call(
                        "TEXT",
                        vec![call(
                            "SUM",
                            vec![
                                FormulaExpr::Number(Decimal::from(1)),
                                FormulaExpr::Number(Decimal::from(2)),
                            ]
                        )]
                    ),
                    FormulaExpr::Text("x".into()),
                ]
            )]
        );
    }

    #[test]
    fn test_parse_copy_marker_and_multiple_terms() {
        assert_eq!(
            terms("^^, 1"),
            vec![
                FormulaExpr::CopyAbove,
                FormulaExpr::Number(Decimal::from(1))
            ]
        );
        assert_eq!(
            terms("SUM(^^)"),
            vec![call("SUM", vec![FormulaExpr::CopyAbove])]
        );
    }

    #[test]
    fn test_parse_marker_is_optional() {
        assert_eq!(parse_formula("=1,2").unwrap(), parse_formula("1,2").unwrap());
    }

    #[test]
    fn test_parse_empty_body() {
        assert!(terms("").is_empty());
        assert!(terms("=").is_empty());
    }

    #[test]
    fn test_parse_malformed() {
        for bad in [
            "SUM(1,,2)",
            "SUM(1,",
            "SUM(1",
            "SUM(1))",
            "SUM(1)(2)",
            "SUM(1)X",
            "\"abc",
            "\"a\"b\"",
            "a1",
            "A",
            "1.",
            ".5",
            "+1",
            "1+2",
            "^^^",
            "(1)",
        ] {
            let err = parse_formula(bad).unwrap_err();
            assert!(
                matches!(err, FormulaError::Parse(_)),
                "{} gave {:?}",
                bad,
                err
            );
        }
    }

    #[test]
    fn test_parse_nesting_limit() {
        let parser = FormulaParser::with_max_nesting(3);
        assert!(parser.parse("A(B(C(1)))").is_ok());
        assert!(matches!(
            parser.parse("A(B(C(D(1))))"),
            Err(FormulaError::NestingTooDeep(3))
        ));
    }
}
