//! Text functions

use pipe_sheets_core::{ErrorKind, Value};

/// CONCAT(texts...)
///
/// Joins text arguments with no separator. The first error argument is
/// returned unchanged; any other non-text argument is
/// `CannotConcatenateNonString`.
pub fn fn_concat(args: &[Value]) -> Value {
    if let Some(e) = args.iter().find_map(Value::get_error) {
        return Value::Error(e);
    }

    let mut result = String::new();
    for arg in args {
        match arg.as_text() {
            Some(s) => result.push_str(s),
            None => return Value::Error(ErrorKind::CannotConcatenateNonString),
        }
    }

    Value::Text(result)
}

/// TEXT(value, ...)
///
/// Renders the first argument as text; the rest are ignored.
pub fn fn_text(args: &[Value]) -> Value {
    match args.first() {
        Some(Value::Error(e)) => Value::Error(*e),
        Some(v) => Value::Text(v.to_plain_text()),
        None => Value::Error(ErrorKind::ArgumentCount),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_concat() {
        assert_eq!(
            fn_concat(&[Value::text("a"), Value::text("b"), Value::text("c")]),
            Value::text("abc")
        );
        assert_eq!(fn_concat(&[]), Value::empty());
    }

    #[test]
    fn test_concat_rejects_numbers() {
        assert_eq!(
            fn_concat(&[Value::text("a"), Value::number(5)]),
            Value::Error(ErrorKind::CannotConcatenateNonString)
        );
    }

    #[test]
    fn test_concat_error_wins() {
        assert_eq!(
            fn_concat(&[
                Value::number(5),
                Value::Error(ErrorKind::UndefinedCellReference)
            ]),
            Value::Error(ErrorKind::UndefinedCellReference)
        );
    }

    #[test]
    fn test_text_renders_first_argument() {
        assert_eq!(
            fn_text(&[Value::Number("1.50".parse().unwrap())]),
            Value::text("1.5")
        );
        assert_eq!(
            fn_text(&[Value::text("x"), Value::number(9)]),
            Value::text("x")
        );
        assert_eq!(
            fn_text(&[Value::Error(ErrorKind::Overflow)]),
            Value::Error(ErrorKind::Overflow)
        );
    }

    #[test]
    fn test_text_feeds_concat() {
        let n = fn_text(&[Value::number(42)]);
        assert_eq!(
            fn_concat(&[Value::text("n="), n]),
            Value::text("n=42")
        );
    }
}
