//! Grid file options

use pipe_sheets_core::{ErrorKind, FORMULA_MARKER};

/// Default cell delimiter
pub const DEFAULT_DELIMITER: u8 = b'|';

/// Options for reading grid files
#[derive(Debug, Clone)]
pub struct GridReadOptions {
    /// Cell delimiter (default: `|`)
    pub delimiter: u8,
    /// Leading character that marks a formula (default: `=`)
    pub formula_marker: char,
}

impl Default for GridReadOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            formula_marker: FORMULA_MARKER,
        }
    }
}

/// Options for writing grid files
#[derive(Debug, Clone)]
pub struct GridWriteOptions {
    /// Cell delimiter (default: `|`)
    pub delimiter: u8,
    /// Line terminator
    pub line_terminator: LineTerminator,
    /// End every row with a delimiter, as in `a|b|`
    pub trailing_delimiter: bool,
    /// How failed cells are written
    pub errors: ErrorRendering,
}

impl Default for GridWriteOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            line_terminator: LineTerminator::LF,
            trailing_delimiter: false,
            errors: ErrorRendering::Generic,
        }
    }
}

/// Line terminator type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTerminator {
    /// Unix-style (LF)
    LF,
    /// Windows-style (CRLF)
    CRLF,
    /// Mac classic (CR)
    CR,
}

impl LineTerminator {
    /// The terminator bytes
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            LineTerminator::LF => b"\n",
            LineTerminator::CRLF => b"\r\n",
            LineTerminator::CR => b"\r",
        }
    }
}

/// How error values appear in written output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorRendering {
    /// Every error as `#ERROR`
    #[default]
    Generic,
    /// Each error kind as its own sentinel, e.g. `#CIRCULAR_REFERENCE`
    Kind,
}

impl ErrorRendering {
    /// Sentinel for an error kind
    pub fn render(&self, kind: ErrorKind) -> &'static str {
        match self {
            ErrorRendering::Generic => ErrorKind::generic_sentinel(),
            ErrorRendering::Kind => kind.as_str(),
        }
    }
}
