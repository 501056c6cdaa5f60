//! Error types for problem construction.
//!
//! Everything here is a user-input error: lexing, parsing, sort checking,
//! arity checking, and declaration shadowing. Conflicts discovered during
//! search are ordinary solver states, never errors.

use thiserror::Error;

/// Errors produced while reading or constructing a problem.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Lexical or syntactic error in the input.
    #[error("parse error at {line}:{col}: {message}")]
    Parse {
        /// 1-based source line.
        line: u32,
        /// 1-based source column.
        col: u32,
        /// What went wrong.
        message: String,
    },
    /// Reference to a name that was never declared.
    #[error("undefined symbol `{0}`")]
    UndefinedSymbol(String),
    /// Declaration of a name that already names a sort or a function.
    #[error("symbol `{0}` shadows an earlier declaration")]
    DuplicateSymbol(String),
    /// Application with the wrong number of arguments.
    #[error("`{symbol}` expects {expected} argument(s), got {actual}")]
    ArityMismatch {
        /// The applied function symbol.
        symbol: String,
        /// Declared parameter count.
        expected: usize,
        /// Supplied argument count.
        actual: usize,
    },
    /// A term was built or used at the wrong sort.
    #[error("sort mismatch: expected {expected}, got {actual}")]
    SortMismatch {
        /// The sort required by the context.
        expected: String,
        /// The sort actually found.
        actual: String,
    },
}

impl CoreError {
    /// Shorthand for a positioned parse error.
    pub fn parse(line: u32, col: u32, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            col,
            message: message.into(),
        }
    }
}

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
