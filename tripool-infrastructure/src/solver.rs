use std::time::Duration;

use tripool_application::{BinaryProgramSolver, SolveAttempt};
use tripool_ilp::{BinaryProgram, SolveHandle, SolveOutcome};

/// [`BinaryProgramSolver`] backed by `good_lp`.
///
/// An unbounded wait solves on the calling thread; a bounded one hands the
/// solve to a worker that later waits resume.
#[derive(Default)]
pub struct GoodLpSolver;

pub struct GoodLpAttempt(SolveHandle);

impl SolveAttempt for GoodLpAttempt {
    fn wait(&mut self, budget: Option<Duration>) -> SolveOutcome {
        self.0.wait(budget)
    }
}

impl BinaryProgramSolver for GoodLpSolver {
    fn start<'a>(&'a self, program: &BinaryProgram) -> Box<dyn SolveAttempt + 'a> {
        Box::new(GoodLpAttempt(SolveHandle::new(program)))
    }
}
