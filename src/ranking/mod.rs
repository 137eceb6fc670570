pub mod ai;
pub mod combined;
pub mod fallback;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{Donation, GeoLocation, MatchResult, NgoCandidate};
use crate::error::Result;
use crate::scoring::validate_radius;

pub use ai::AiRanker;
pub use combined::CombinedRanker;
pub use fallback::RuleBasedRanker;

/// Trait for matching strategies
#[async_trait]
pub trait Ranker: Send + Sync {
    /// Rank `candidates` for the donation in `request`
    async fn rank(&self, request: &MatchRequest, candidates: &[NgoCandidate]) -> Result<MatchResult>;

    /// Get ranker name for logging
    fn name(&self) -> &str;
}

/// Input of one matching call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchRequest {
    pub donation: Donation,

    #[serde(default)]
    pub donor_location: Option<GeoLocation>,

    #[serde(default = "default_max_distance_km")]
    pub max_distance_km: f64,
}

fn default_max_distance_km() -> f64 {
    25.0
}

impl MatchRequest {
    pub fn new(donation: Donation) -> Self {
        Self {
            donation,
            donor_location: None,
            max_distance_km: default_max_distance_km(),
        }
    }

    pub fn with_donor_location(mut self, location: GeoLocation) -> Self {
        self.donor_location = Some(location);
        self
    }

    pub fn with_max_distance_km(mut self, max_distance_km: f64) -> Self {
        self.max_distance_km = max_distance_km;
        self
    }

    /// Boundary check for requests assembled from user input
    pub fn validate(&self) -> Result<()> {
        self.donation.validate()?;
        validate_radius(self.max_distance_km)?;
        if let Some(location) = &self.donor_location {
            location.validate()?;
        }
        Ok(())
    }
}

/// Candidates that may be selected at all
pub(crate) fn eligible(candidates: &[NgoCandidate]) -> impl Iterator<Item = &NgoCandidate> {
    candidates.iter().filter(|ngo| ngo.can_accept())
}
