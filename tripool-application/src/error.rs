use std::time::Duration;

use thiserror::Error;
use tripool_domain::{InputValidationError, MatchingViolation};
use tripool_ilp::ProgramError;

/// Non-optimal solver statuses.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverStatusError {
    #[error("Solver reported the pooling model as infeasible")]
    Infeasible,
    #[error("Solver reported the pooling model as unbounded")]
    Unbounded,
    #[error("Solver did not finish within {limit:?}")]
    TimedOut { limit: Duration },
    #[error("Solver failed: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PoolingError {
    #[error("Invalid input: {0}")]
    Validation(#[from] InputValidationError),
    #[error(transparent)]
    Solver(#[from] SolverStatusError),
    #[error("Pooling model could not be built: {0}")]
    Model(#[from] ProgramError),
    #[error("Solver returned an inconsistent pooling: {0}")]
    InconsistentSolution(#[from] MatchingViolation),
}

impl PoolingError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Solver(SolverStatusError::TimedOut { .. }))
    }
}
