use tripool_domain::{CandidateSelector, PoolingProblem};
use tripool_ilp::{BinaryProgram, ProgramError};

use crate::model::PoolingModel;

/// Transcribes a [`PoolingProblem`] into a [`BinaryProgram`].
///
/// One binary per candidate pair `i < j`; pairs below the threshold never get
/// a variable. Constraints:
/// - every trip is covered by at most one selected pair,
/// - at most `k` pairs are selected.
///
/// The objective is the plain benefit sum, each pair being counted once.
pub struct PoolingModelBuilder;

impl PoolingModelBuilder {
    pub fn build(problem: &PoolingProblem) -> Result<PoolingModel, ProgramError> {
        let candidates = CandidateSelector::select(problem);
        let mut program =
            BinaryProgram::maximise(candidates.iter().map(|pair| pair.benefit).collect())?;

        let trip_count = problem.trips().len();
        let mut trip_pairs: Vec<Vec<(usize, f64)>> = vec![Vec::new(); trip_count];
        for (idx, pair) in candidates.iter().enumerate() {
            trip_pairs[pair.first.0].push((idx, 1.0));
            trip_pairs[pair.second.0].push((idx, 1.0));
        }
        for terms in trip_pairs.into_iter().filter(|terms| terms.len() > 1) {
            program.add_constraint(terms, 1.0)?;
        }

        let pool_limit = problem.pool_limit().get();
        if candidates.len() > pool_limit {
            let terms = (0..candidates.len()).map(|idx| (idx, 1.0)).collect();
            program.add_constraint(terms, pool_limit as f64)?;
        }

        tracing::debug!(
            trip_count,
            candidate_count = candidates.len(),
            constraint_count = program.constraints().len(),
            threshold = problem.threshold().value(),
            pool_limit,
            "Pooling model built"
        );

        Ok(PoolingModel {
            candidates,
            program,
        })
    }
}
