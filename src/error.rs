//! Error taxonomy for instance loading and initial construction.

use std::fmt;
use std::io;

/// Errors surfaced by the solver.
///
/// `MalformedInstance` and `InfeasibleInstance` are the only failures a
/// caller can observe: once construction succeeds, the search loop always
/// terminates with a feasible solution. Cancellation is not an error and is
/// reported through [`crate::utils::TerminationReason`] instead.
#[derive(Debug)]
pub enum SolverError {
    /// Structural or semantic input error, raised during loading.
    /// The message names the violated constraint and the offending record.
    MalformedInstance(String),
    /// No feasible assignment exists under the capacity and fleet
    /// configuration. Raised by initial construction, before any search
    /// iteration runs.
    InfeasibleInstance(String),
    /// Underlying I/O failure while reading an instance file.
    Io(io::Error),
}

impl SolverError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        SolverError::MalformedInstance(reason.into())
    }

    pub(crate) fn infeasible(reason: impl Into<String>) -> Self {
        SolverError::InfeasibleInstance(reason.into())
    }
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::MalformedInstance(reason) => {
                write!(f, "malformed instance: {}", reason)
            }
            SolverError::InfeasibleInstance(reason) => {
                write!(f, "infeasible instance: {}", reason)
            }
            SolverError::Io(err) => write!(f, "i/o error: {}", err),
        }
    }
}

impl std::error::Error for SolverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SolverError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for SolverError {
    fn from(err: io::Error) -> Self {
        SolverError::Io(err)
    }
}
