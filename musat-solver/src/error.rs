//! Solver error types.
//!
//! Only two things can go wrong here: a problem-construction error bubbling
//! up from the core crate, or a broken internal invariant (a lemma that is
//! not false under the trail, a conflict residue larger than two below a
//! decision). Conflict states are never errors; the resolution rules handle
//! them.

use thiserror::Error;

/// Errors raised by the engine.
#[derive(Error, Debug)]
pub enum SolverError {
    /// A programmer error: an internal invariant did not hold.
    #[error("internal invariant violated: {0}")]
    Invariant(String),
    /// A problem-construction error from the core crate.
    #[error(transparent)]
    Core(#[from] musat_core::CoreError),
}

impl SolverError {
    /// Shorthand for an invariant violation.
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }
}

/// Result alias for solver operations.
pub type Result<T> = std::result::Result<T, SolverError>;
