//! Math functions

use pipe_sheets_core::{ErrorKind, Value};
use rust_decimal::Decimal;

/// SUM(values...)
///
/// Numbers and decimal text are added exactly. The first error argument is
/// returned unchanged; any other argument is `NonNumericArgument`.
pub fn fn_sum(args: &[Value]) -> Value {
    let mut sum = Decimal::ZERO;

    for arg in args {
        if let Value::Error(e) = arg {
            return Value::Error(*e);
        }
        let Some(n) = arg.as_number() else {
            return Value::Error(ErrorKind::NonNumericArgument);
        };
        sum = match sum.checked_add(n) {
            Some(total) => total,
            None => return Value::Error(ErrorKind::Overflow),
        };
    }

    Value::Number(sum)
}
