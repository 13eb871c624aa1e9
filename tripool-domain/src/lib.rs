#![warn(clippy::uninlined_format_args)]

pub mod error;
pub mod model;
pub mod services;

pub use error::InputValidationError;
pub use model::{
    BenefitMatrix, PoolLimit, PooledPair, Pooling, PoolingProblem, Threshold, TripId, TripSet,
};
pub use services::{CandidatePair, CandidateSelector, MatchingVerifier, MatchingViolation};
