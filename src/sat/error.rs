//! Errors raised while building formulas from user input.
//!
//! Unsatisfiability is never an error: solvers report it through
//! [`Status::Unsat`](crate::sat::cdcl::Status). Broken solver invariants are
//! assertion failures, not variants here.

use thiserror::Error;

/// Failures raised while constructing a clause set or reading an input format.
#[derive(Debug, Error)]
pub enum Error {
    /// A clause with no literals was supplied.
    #[error("clause {clause} has no literals")]
    EmptyClause {
        /// Zero-based index of the offending clause in the input.
        clause: usize,
    },

    /// A literal carried an empty or whitespace-only identifier.
    #[error("clause {clause} contains a blank variable identifier")]
    BlankIdentifier {
        /// Zero-based index of the offending clause in the input.
        clause: usize,
    },

    /// A DIMACS token could not be read as an integer literal.
    #[error("invalid literal '{token}' on line {line}")]
    InvalidLiteral {
        /// One-based line number.
        line: usize,
        /// The token as it appeared in the input.
        token: String,
    },

    /// A Sudoku puzzle description was malformed.
    #[error("invalid sudoku: {0}")]
    InvalidSudoku(String),

    /// Reading the input failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result alias used by the construction and parsing APIs.
pub type Result<T> = std::result::Result<T, Error>;
