//! Unified error types for satbench.

use thiserror::Error;

/// The main error type for satbench operations.
///
/// Unsatisfiable inputs and exhausted budgets are verdicts, not errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed DIMACS input.
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A literal whose variable is 0 or beyond the declared variable count.
    #[error("Literal {literal} out of range for {num_vars} variables")]
    LiteralOutOfRange { literal: i64, num_vars: usize },

    /// Malformed or unsupported Sudoku puzzle.
    #[error("Sudoku error: {0}")]
    Sudoku(String),

    /// A SAT model that falsifies an original clause.
    #[error("Verification failed: {solver} returned a model falsifying clause {clause:?}")]
    Verification { solver: String, clause: Vec<i64> },

    /// Invalid solver or experiment configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Shorthand for a parse error at `line`.
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    /// Returns whether this error signals a solver bug rather than bad input.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Verification { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
