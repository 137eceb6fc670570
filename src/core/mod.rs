pub mod donation;
pub mod match_result;
pub mod ngo;

pub use donation::{Donation, QualityLabel, Unit};
pub use match_result::{MatchMethod, MatchResult, ScoredCandidate, MAX_ALTERNATIVES};
pub use ngo::{GeoLocation, NgoCandidate};
