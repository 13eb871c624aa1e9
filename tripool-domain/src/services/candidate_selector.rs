use crate::model::{PoolingProblem, TripId};

/// An unordered trip pair (`first < second` by position) eligible for pooling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CandidatePair {
    pub first: TripId,
    pub second: TripId,
    pub benefit: f64,
}

/// Enumerates the pairs that may appear in a matching.
pub struct CandidateSelector;

impl CandidateSelector {
    /// Returns every pair `i < j` whose benefit clears the threshold.
    ///
    /// Pairs without a positive benefit are left out: pooling them never
    /// raises the objective, so an optimal matching has no reason to hold them.
    pub fn select(problem: &PoolingProblem) -> Vec<CandidatePair> {
        let trip_count = problem.trips().len();
        let threshold = problem.threshold();
        let mut candidates = Vec::new();
        for first in 0..trip_count {
            for second in (first + 1)..trip_count {
                let (first, second) = (TripId(first), TripId(second));
                let benefit = problem.benefit(first, second);
                if benefit > 0.0 && threshold.admits(benefit) {
                    candidates.push(CandidatePair {
                        first,
                        second,
                        benefit,
                    });
                }
            }
        }
        candidates
    }
}
