use std::time::Duration;

use tripool_domain::{MatchingVerifier, Pooling, PoolingProblem};
use tripool_ilp::SolveOutcome;

use crate::{
    error::{PoolingError, SolverStatusError},
    model::{PoolingModel, SolveOptions},
    model_builder::PoolingModelBuilder,
    ports::{BinaryProgramSolver, SolveAttempt},
};

/// Finds the benefit-maximising pairwise pooling of a problem.
pub struct PoolingOptimizer<'a> {
    solver: &'a dyn BinaryProgramSolver,
    options: SolveOptions,
}

impl<'a> PoolingOptimizer<'a> {
    pub fn new(solver: &'a dyn BinaryProgramSolver) -> Self {
        Self {
            solver,
            options: SolveOptions::default(),
        }
    }

    pub fn with_options(self, options: SolveOptions) -> Self {
        Self { options, ..self }
    }

    /// Validates raw tables first, then optimizes.
    pub fn optimize_raw<S: AsRef<str>>(
        &self,
        labels: &[S],
        rows: Vec<Vec<f64>>,
        threshold: f64,
        pool_limit: f64,
    ) -> Result<Pooling, PoolingError> {
        let problem = PoolingProblem::from_raw(labels, rows, threshold, pool_limit)?;
        self.optimize(&problem)
    }

    pub fn optimize(&self, problem: &PoolingProblem) -> Result<Pooling, PoolingError> {
        let model = PoolingModelBuilder::build(problem)?;
        let assignment = self.solve_with_retry(&model)?;
        let pooling = extract_pooling(problem, &model, &assignment)?;

        if let Err(violation) = MatchingVerifier::verify(problem, &pooling) {
            tracing::error!(
                reject_reason = "inconsistent_solution",
                violation = %violation,
                pair_count = pooling.len(),
                "Solver assignment violates the pooling constraints"
            );
            return Err(violation.into());
        }

        for pair in pooling.pairs() {
            tracing::debug!(pair = %pair, benefit = pair.benefit(), "Pooled pair");
        }
        tracing::info!(
            trip_count = problem.trips().len(),
            pair_count = pooling.len(),
            objective = pooling.objective(),
            "Pooling optimized"
        );
        Ok(pooling)
    }

    /// Waits once within the time limit, then at most once more within the
    /// relaxed budget. The second wait resumes the first solve.
    fn solve_with_retry(&self, model: &PoolingModel) -> Result<Vec<bool>, SolverStatusError> {
        let mut attempt = self.solver.start(&model.program);
        match await_outcome(attempt.as_mut(), model, self.options.time_limit) {
            Err(SolverStatusError::TimedOut { limit }) => {
                let Some(relaxed) = self.options.relaxed_time_limit else {
                    return Err(SolverStatusError::TimedOut { limit });
                };
                tracing::warn!(
                    time_limit_ms = limit.as_millis() as u64,
                    relaxed_time_limit_ms = relaxed.as_millis() as u64,
                    "Pooling solve timed out, waiting once more with a relaxed budget"
                );
                await_outcome(attempt.as_mut(), model, Some(relaxed))
            }
            other => other,
        }
    }
}

fn await_outcome<A: SolveAttempt + ?Sized>(
    attempt: &mut A,
    model: &PoolingModel,
    budget: Option<Duration>,
) -> Result<Vec<bool>, SolverStatusError> {
    match attempt.wait(budget) {
        SolveOutcome::Optimal { assignment, .. } => Ok(assignment),
        SolveOutcome::Infeasible => {
            // The empty matching satisfies every constraint of a valid model.
            tracing::error!(
                reject_reason = "infeasible",
                candidate_count = model.candidates.len(),
                "Solver reported an always-feasible pooling model as infeasible"
            );
            Err(SolverStatusError::Infeasible)
        }
        SolveOutcome::Unbounded => {
            tracing::error!(
                reject_reason = "unbounded",
                candidate_count = model.candidates.len(),
                "Solver reported a bounded pooling model as unbounded"
            );
            Err(SolverStatusError::Unbounded)
        }
        SolveOutcome::TimedOut => match budget {
            Some(limit) => Err(SolverStatusError::TimedOut { limit }),
            None => {
                tracing::error!(
                    reject_reason = "unrequested_timeout",
                    "Solver timed out without a time limit"
                );
                Err(SolverStatusError::Backend(
                    "solver timed out without a time limit".to_owned(),
                ))
            }
        },
        SolveOutcome::Error(message) => {
            tracing::error!(reject_reason = "backend", %message, "Solver failed");
            Err(SolverStatusError::Backend(message))
        }
    }
}

fn extract_pooling(
    problem: &PoolingProblem,
    model: &PoolingModel,
    assignment: &[bool],
) -> Result<Pooling, SolverStatusError> {
    if assignment.len() != model.candidates.len() {
        return Err(SolverStatusError::Backend(format!(
            "assignment has {} values for {} variables",
            assignment.len(),
            model.candidates.len()
        )));
    }

    let pairs = model
        .candidates
        .iter()
        .zip(assignment)
        .filter(|(_, selected)| **selected)
        .filter_map(|(candidate, _)| problem.pooled_pair(candidate.first, candidate.second))
        .collect();
    Ok(Pooling::from_pairs(pairs))
}
