use std::time::Duration;

use tripool_domain::CandidatePair;
use tripool_ilp::BinaryProgram;

/// Default budget for the first solve attempt.
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(30);
/// Default budget for the single retry after a time-out.
pub const DEFAULT_RELAXED_TIME_LIMIT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolveOptions {
    /// `None` lets the solver run to completion.
    pub time_limit: Option<Duration>,
    /// Budget of the one retry after a time-out; `None` disables the retry.
    pub relaxed_time_limit: Option<Duration>,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            time_limit: Some(DEFAULT_TIME_LIMIT),
            relaxed_time_limit: Some(DEFAULT_RELAXED_TIME_LIMIT),
        }
    }
}

impl SolveOptions {
    pub fn unlimited() -> Self {
        Self {
            time_limit: None,
            relaxed_time_limit: None,
        }
    }

    pub fn with_time_limit(self, time_limit: Option<Duration>) -> Self {
        Self { time_limit, ..self }
    }

    pub fn with_relaxed_time_limit(self, relaxed_time_limit: Option<Duration>) -> Self {
        Self {
            relaxed_time_limit,
            ..self
        }
    }
}

/// A pooling problem transcribed into a binary program.
///
/// Variable `i` of `program` decides whether `candidates[i]` is pooled.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolingModel {
    pub candidates: Vec<CandidatePair>,
    pub program: BinaryProgram,
}
