//! Sequence functions
//!
//! These return [`Value::Sequence`] so their results splice into the
//! enclosing argument list.

use pipe_sheets_core::{ErrorKind, Value};

/// SPREAD(values...): the arguments themselves
pub fn fn_spread(args: &[Value]) -> Value {
    Value::Sequence(args.to_vec())
}

/// SPLIT(values..., _, _): every argument but the last two
///
/// The trailing pair is reserved for a separator and limit that are not
/// interpreted yet.
pub fn fn_split(args: &[Value]) -> Value {
    match args.len().checked_sub(2) {
        Some(keep) => Value::Sequence(args[..keep].to_vec()),
        None => Value::Error(ErrorKind::ArgumentCount),
    }
}

/// INCFROM(start, ...): the first argument unchanged
pub fn fn_incfrom(args: &[Value]) -> Value {
    match args.first() {
        Some(v) => v.clone(),
        None => Value::Error(ErrorKind::ArgumentCount),
    }
}
