use std::collections::HashSet;

use thiserror::Error;

use crate::model::{Pooling, PoolingProblem};

const BENEFIT_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchingViolation {
    #[error("Pair {first}-{second} references an unknown trip")]
    UnknownTrip { first: String, second: String },
    #[error("Trip '{0}' is paired with itself")]
    SelfPair(String),
    #[error("Trip '{0}' appears in more than one pair")]
    TripReused(String),
    #[error("Pair {first}-{second} has benefit {benefit} below threshold {threshold}")]
    BelowThreshold {
        first: String,
        second: String,
        benefit: f64,
        threshold: f64,
    },
    #[error("Pair {first}-{second} reports benefit {reported}, matrix holds {expected}")]
    BenefitMismatch {
        first: String,
        second: String,
        reported: f64,
        expected: f64,
    },
    #[error("{count} pairs exceed the pool limit of {limit}")]
    TooManyPairs { count: usize, limit: usize },
}

/// Checks a pooling against every constraint of its problem.
pub struct MatchingVerifier;

impl MatchingVerifier {
    pub fn verify(problem: &PoolingProblem, pooling: &Pooling) -> Result<(), MatchingViolation> {
        let limit = problem.pool_limit().get();
        if pooling.len() > limit {
            return Err(MatchingViolation::TooManyPairs {
                count: pooling.len(),
                limit,
            });
        }

        let trips = problem.trips();
        let threshold = problem.threshold();
        let mut used = HashSet::with_capacity(pooling.len() * 2);
        for pair in pooling.pairs() {
            let (Some(first), Some(second)) = (trips.id_of(pair.first()), trips.id_of(pair.second()))
            else {
                return Err(MatchingViolation::UnknownTrip {
                    first: pair.first().to_owned(),
                    second: pair.second().to_owned(),
                });
            };
            if first == second {
                return Err(MatchingViolation::SelfPair(pair.first().to_owned()));
            }
            for label in [pair.first(), pair.second()] {
                if !used.insert(label) {
                    return Err(MatchingViolation::TripReused(label.to_owned()));
                }
            }

            let expected = problem.benefit(first, second);
            if (expected - pair.benefit()).abs() > BENEFIT_TOLERANCE {
                return Err(MatchingViolation::BenefitMismatch {
                    first: pair.first().to_owned(),
                    second: pair.second().to_owned(),
                    reported: pair.benefit(),
                    expected,
                });
            }
            if !threshold.admits(expected) {
                return Err(MatchingViolation::BelowThreshold {
                    first: pair.first().to_owned(),
                    second: pair.second().to_owned(),
                    benefit: expected,
                    threshold: threshold.value(),
                });
            }
        }
        Ok(())
    }
}
