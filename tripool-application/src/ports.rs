use std::time::Duration;

use tripool_ilp::{BinaryProgram, SolveOutcome};

/// Integer-programming capability the optimizer delegates to.
pub trait BinaryProgramSolver: Send + Sync {
    /// Starts solving `program`; the outcome is collected through the attempt.
    fn start<'a>(&'a self, program: &BinaryProgram) -> Box<dyn SolveAttempt + 'a>;
}

/// One solve in progress.
pub trait SolveAttempt {
    /// Waits up to `budget` for the outcome, or until it is known when `None`.
    ///
    /// After `TimedOut` the same solve keeps going and may be waited on again.
    fn wait(&mut self, budget: Option<Duration>) -> SolveOutcome;
}
