pub mod candidate_selector;
pub mod matching_verifier;

pub use candidate_selector::{CandidatePair, CandidateSelector};
pub use matching_verifier::{MatchingVerifier, MatchingViolation};
