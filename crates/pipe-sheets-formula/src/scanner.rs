//! Argument scanner
//!
//! Splits a formula body (or the inside of a call's parentheses) into its
//! top-level comma-separated terms. Commas inside string literals or nested
//! parentheses do not split. Whitespace outside string literals is dropped.

use crate::error::{FormulaError, FormulaResult};

/// Split `input` at top-level commas
///
/// An empty (or all-whitespace) input yields no terms. Empty terms such as the
/// middle of `1,,2` or the tail of `1,` are rejected, as are unbalanced
/// parentheses and unterminated string literals.
///
/// # Example
/// ```rust
/// use pipe_sheets_formula::split_arguments;
///
/// let terms = split_arguments(r#"SUM(1, 2), "a,b", A1"#).unwrap();
/// assert_eq!(terms, vec!["SUM(1,2)", "\"a,b\"", "A1"]);
/// ```
pub fn split_arguments(input: &str) -> FormulaResult<Vec<String>> {
    let mut terms = Vec::new();
    let mut current = String::new();
    let mut depth: usize = 0;
    let mut in_string = false;
    let mut saw_separator = false;

    for c in input.chars() {
        if in_string {
            current.push(c);
            if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                current.push(c);
            }
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| FormulaError::Parse("Unbalanced ')'".into()))?;
                current.push(c);
            }
            ',' if depth == 0 => {
                if current.is_empty() {
                    return Err(FormulaError::Parse("Empty argument".into()));
                }
                terms.push(std::mem::take(&mut current));
                saw_separator = true;
            }
            c if c.is_whitespace() => {}
            c => current.push(c),
        }
    }

    if in_string {
        return Err(FormulaError::Parse("Unterminated string literal".into()));
    }
    if depth != 0 {
        return Err(FormulaError::Parse("Unbalanced '('".into()));
    }

    if current.is_empty() {
        if saw_separator {
            return Err(FormulaError::Parse("Empty argument".into()));
        }
    } else {
        terms.push(current);
    }

    Ok(terms)
}
