//! Formula error types

use pipe_sheets_core::ErrorKind;
use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur while parsing formulas or registering functions
///
/// Evaluation itself never fails with a `FormulaError`; problems found while
/// evaluating become [`pipe_sheets_core::Value::Error`] values. Use
/// [`FormulaError::kind`] to turn a parse failure into one.
#[derive(Debug, Error)]
pub enum FormulaError {
    /// Formula parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Formula nests calls deeper than the parser allows
    #[error("Formula nesting exceeds {0} levels")]
    NestingTooDeep(usize),

    /// Unknown function
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Wrong number of arguments
    #[error("Wrong number of arguments for {function}: expected {expected}, got {actual}")]
    ArgumentCount {
        function: String,
        expected: String,
        actual: usize,
    },

    /// A function name that is a suffix of another registered name (or vice versa)
    #[error("Function name {name} is ambiguous with {existing}")]
    AmbiguousFunctionName { name: String, existing: String },
}

impl FormulaError {
    /// The error value this failure produces when it reaches a cell
    pub fn kind(&self) -> ErrorKind {
        match self {
            FormulaError::Parse(_) | FormulaError::AmbiguousFunctionName { .. } => {
                ErrorKind::Malformed
            }
            FormulaError::NestingTooDeep(_) => ErrorKind::DepthExceeded,
            FormulaError::UnknownFunction(_) => ErrorKind::UnknownFunction,
            FormulaError::ArgumentCount { .. } => ErrorKind::ArgumentCount,
        }
    }
}
