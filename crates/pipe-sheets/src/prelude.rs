//! Prelude module - common imports for pipe-sheets users
//!
//! ```rust
//! use pipe_sheets::prelude::*;
//! ```

pub use crate::{
    // Calculation types
    CalculationOptions,
    CalculationStats,
    // Cell types
    CellAddress,
    ErrorKind,
    // Error types
    Error,
    // Formula types
    Evaluator,
    EvaluatorOptions,
    // Main types
    Grid,
    // Extension traits
    GridCalculationExt,
    GridExt,
    // I/O types
    GridReadOptions,
    GridReader,
    GridWriteOptions,
    GridWriter,
    Result,
    Value,
};
