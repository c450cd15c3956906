//! Value types

use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// Sentinel written for any error when error kinds are not rendered
pub const GENERIC_ERROR_SENTINEL: &str = "#ERROR";

/// The result of evaluating a cell or a formula term
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// Text value (rendered with double quotes in formula syntax)
    Text(String),

    /// Exact decimal number
    Number(Decimal),

    /// Several values produced by one term (SPREAD, SPLIT, multi-term formulas)
    Sequence(Vec<Value>),

    /// Error sentinel
    Error(ErrorKind),
}

impl Value {
    /// Create a new text value
    pub fn text<S: Into<String>>(s: S) -> Self {
        Value::Text(s.into())
    }

    /// Create a new number value
    pub fn number<N: Into<Decimal>>(n: N) -> Self {
        Value::Number(n.into())
    }

    /// The empty text value held by blank cells
    pub fn empty() -> Self {
        Value::Text(String::new())
    }

    /// Classify the raw text of a literal (non-formula) cell
    ///
    /// - empty text stays empty text
    /// - a decimal literal becomes a number
    /// - text wrapped in double quotes becomes the unquoted text
    /// - anything else is kept verbatim as text
    pub fn from_literal(raw: &str) -> Self {
        if raw.is_empty() {
            return Value::empty();
        }

        if let Some(n) = parse_decimal(raw) {
            return Value::Number(n);
        }

        if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
            return Value::text(&raw[1..raw.len() - 1]);
        }

        Value::text(raw)
    }

    /// Collapse a list of term results into one value
    ///
    /// No values is empty text, a single value is returned as is, and
    /// anything longer becomes a [`Value::Sequence`].
    pub fn from_values(mut values: Vec<Value>) -> Self {
        match values.len() {
            0 => Value::empty(),
            1 => values.pop().unwrap_or_else(Value::empty),
            _ => Value::Sequence(values),
        }
    }

    /// Append this value to `out`, splicing sequences element by element
    pub fn flatten_into(self, out: &mut Vec<Value>) {
        match self {
            Value::Sequence(items) => {
                for item in items {
                    item.flatten_into(out);
                }
            }
            other => out.push(other),
        }
    }

    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Get the error if this is one
    pub fn get_error(&self) -> Option<ErrorKind> {
        match self {
            Value::Error(e) => Some(*e),
            _ => None,
        }
    }

    /// Get the text contents if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get the value as an exact decimal
    ///
    /// Text is accepted when its contents are a decimal literal.
    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(s) => parse_decimal(s),
            _ => None,
        }
    }

    /// Render without formula quoting (text contents as is)
    pub fn to_plain_text(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Number(n) => format_decimal(*n),
            Value::Sequence(items) => items
                .iter()
                .map(Value::to_plain_text)
                .collect::<Vec<_>>()
                .join(","),
            Value::Error(e) => e.as_str().to_string(),
        }
    }

    /// Render in formula syntax (text wrapped in double quotes)
    pub fn to_formula_text(&self) -> String {
        self.to_string()
    }

    /// Get the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Number(_) => "number",
            Value::Sequence(_) => "sequence",
            Value::Error(_) => "error",
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::empty()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "\"{}\"", s),
            Value::Number(n) => write!(f, "{}", format_decimal(*n)),
            Value::Sequence(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
            Value::Error(e) => write!(f, "{}", e),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::text(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Decimal> for Value {
    fn from(n: Decimal) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<ErrorKind> for Value {
    fn from(e: ErrorKind) -> Self {
        Value::Error(e)
    }
}

/// Parse a decimal literal (`-?digits(.digits)?`) exactly
///
/// Returns `None` for anything else, including exponents, leading `+`,
/// surrounding whitespace and values outside the decimal range.
pub fn parse_decimal(s: &str) -> Option<Decimal> {
    let digits = s.strip_prefix('-').unwrap_or(s);
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (digits, None),
    };

    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if let Some(frac) = frac_part {
        if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
    }

    Decimal::from_str(s).ok()
}

/// Canonical decimal text: no trailing fractional zeros, no negative zero
fn format_decimal(n: Decimal) -> String {
    n.normalize().to_string()
}

/// Error sentinels produced by formula evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorKind {
    /// Unbalanced parentheses, unterminated quote or otherwise invalid formula text
    Malformed,
    /// CONCAT received an argument that is not text
    CannotConcatenateNonString,
    /// SUM received an argument that is not a decimal
    NonNumericArgument,
    /// A cell depends on itself
    CircularReference,
    /// Formula-copy marker used in the first row
    NoRowAbove,
    /// Call to a function that is not registered
    UnknownFunction,
    /// Reference to a cell outside the grid
    UndefinedCellReference,
    /// Function called with too few or too many arguments
    ArgumentCount,
    /// Evaluation nested deeper than the configured limit
    DepthExceeded,
    /// Decimal arithmetic overflow
    Overflow,
}

impl ErrorKind {
    /// All error kinds, in declaration order
    pub const ALL: [ErrorKind; 10] = [
        ErrorKind::Malformed,
        ErrorKind::CannotConcatenateNonString,
        ErrorKind::NonNumericArgument,
        ErrorKind::CircularReference,
        ErrorKind::NoRowAbove,
        ErrorKind::UnknownFunction,
        ErrorKind::UndefinedCellReference,
        ErrorKind::ArgumentCount,
        ErrorKind::DepthExceeded,
        ErrorKind::Overflow,
    ];

    /// Get the kind-specific sentinel for this error
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Malformed => "#MALFORMED",
            ErrorKind::CannotConcatenateNonString => "#CANNOT_CONCATENATE_NON_STRING",
            ErrorKind::NonNumericArgument => "#NON_NUMERIC_ARGUMENT",
            ErrorKind::CircularReference => "#CIRCULAR_REFERENCE",
            ErrorKind::NoRowAbove => "#NO_ROW_ABOVE",
            ErrorKind::UnknownFunction => "#UNKNOWN_FUNCTION",
            ErrorKind::UndefinedCellReference => "#UNDEFINED_CELL_REFERENCE",
            ErrorKind::ArgumentCount => "#ARGUMENT_COUNT",
            ErrorKind::DepthExceeded => "#DEPTH_EXCEEDED",
            ErrorKind::Overflow => "#OVERFLOW",
        }
    }

    /// Parse a kind-specific sentinel
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
    }

    /// The sentinel used when error kinds are not distinguished
    pub fn generic_sentinel() -> &'static str {
        GENERIC_ERROR_SENTINEL
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_from_literal() {
        assert_eq!(Value::from_literal(""), Value::empty());
        assert_eq!(Value::from_literal("42"), Value::number(42));
        assert_eq!(Value::from_literal("-1.25"), Value::Number(dec("-1.25")));
        assert_eq!(Value::from_literal("\"quoted\""), Value::text("quoted"));
        assert_eq!(Value::from_literal("plain"), Value::text("plain"));
        assert_eq!(Value::from_literal(" 42"), Value::text(" 42"));
        assert_eq!(Value::from_literal("\""), Value::text("\""));
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("0.1"), Some(dec("0.1")));
        assert_eq!(parse_decimal("-7"), Some(dec("-7")));
        assert_eq!(parse_decimal("12.50"), Some(dec("12.5")));
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("-"), None);
        assert_eq!(parse_decimal("1."), None);
        assert_eq!(parse_decimal(".5"), None);
        assert_eq!(parse_decimal("+1"), None);
        assert_eq!(parse_decimal("1e3"), None);
        assert_eq!(parse_decimal("1_000"), None);
        assert_eq!(parse_decimal("abc"), None);
    }

    #[test]
    fn test_formula_rendering() {
        assert_eq!(Value::text("abc").to_string(), "\"abc\"");
        assert_eq!(Value::Number(dec("1.500")).to_string(), "1.5");
        assert_eq!(Value::Number(dec("-0.0")).to_string(), "0");
        assert_eq!(
            Value::Sequence(vec![Value::number(1), Value::text("x")]).to_string(),
            "1,\"x\""
        );
        assert_eq!(
            Value::Error(ErrorKind::NoRowAbove).to_string(),
            "#NO_ROW_ABOVE"
        );
    }

    #[test]
    fn test_plain_rendering() {
        assert_eq!(Value::text("abc").to_plain_text(), "abc");
        assert_eq!(Value::Number(dec("2.000")).to_plain_text(), "2");
        assert_eq!(
            Value::Sequence(vec![Value::text("a"), Value::text("b")]).to_plain_text(),
            "a,b"
        );
    }

    #[test]
    fn test_as_number() {
        assert_eq!(Value::number(3).as_number(), Some(dec("3")));
        assert_eq!(Value::text("0.2").as_number(), Some(dec("0.2")));
        assert_eq!(Value::text("two").as_number(), None);
        assert_eq!(Value::empty().as_number(), None);
        assert_eq!(Value::Error(ErrorKind::Malformed).as_number(), None);
    }

    #[test]
    fn test_from_values_and_flatten() {
        assert_eq!(Value::from_values(vec![]), Value::empty());
        assert_eq!(Value::from_values(vec![Value::number(1)]), Value::number(1));

        let mut out = Vec::new();
        Value::Sequence(vec![
            Value::number(1),
            Value::Sequence(vec![Value::number(2), Value::number(3)]),
        ])
        .flatten_into(&mut out);
        assert_eq!(out, vec![Value::number(1), Value::number(2), Value::number(3)]);
    }

    #[test]
    fn test_error_kind_sentinels() {
        for kind in ErrorKind::ALL {
            assert_eq!(ErrorKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(
            ErrorKind::from_str("#circular_reference"),
            Some(ErrorKind::CircularReference)
        );
        assert_eq!(ErrorKind::from_str("#ERROR"), None);
        assert_eq!(ErrorKind::generic_sentinel(), "#ERROR");
    }
}
