use async_trait::async_trait;

use crate::core::{MatchMethod, MatchResult, NgoCandidate, ScoredCandidate, MAX_ALTERNATIVES};
use crate::error::Result;
use crate::ranking::{eligible, MatchRequest, Ranker};
use crate::scoring::capacity_score;

/// Confidence reported by the rule-based matcher, whatever branch it takes
pub const RULE_BASED_CONFIDENCE: f64 = 0.7;

/// Quantity at or above which a donation counts as large
pub const LARGE_DONATION: u32 = 50;
/// Quantity at or above which a donation counts as medium
pub const MEDIUM_DONATION: u32 = 20;

/// Rule-based matcher (fallback when AI ranking is unavailable).
///
/// Makes no external calls and always produces a result.
pub struct RuleBasedRanker;

impl RuleBasedRanker {
    pub fn new() -> Self {
        Self
    }

    pub fn rank_candidates(&self, request: &MatchRequest, candidates: &[NgoCandidate]) -> MatchResult {
        let quantity = request.donation.quantity;

        let mut sorted: Vec<&NgoCandidate> = eligible(candidates).collect();
        if sorted.is_empty() {
            return MatchResult::empty("No NGOs available");
        }
        sorted.sort_by(|a, b| b.capacity.cmp(&a.capacity).then(a.id.cmp(&b.id)));

        let (index, reasoning) = if quantity >= LARGE_DONATION {
            (0, "Matched with highest capacity NGO for large donation")
        } else if quantity >= MEDIUM_DONATION {
            // middle of the capacity ranking, not a proportional fit
            let mid = sorted.len() / 2;
            let index = if mid < sorted.len() { mid } else { 0 };
            (index, "Matched with medium capacity NGO for moderate donation")
        } else {
            (
                sorted.len() - 1,
                "Matched with appropriate capacity NGO for small donation",
            )
        };

        let score = |ngo: &NgoCandidate| {
            let capacity = capacity_score(ngo.capacity, quantity);
            ScoredCandidate::new(ngo.clone(), capacity, capacity)
        };

        let chosen = sorted[index];
        let alternatives: Vec<ScoredCandidate> = sorted
            .iter()
            .take(MAX_ALTERNATIVES)
            .filter(|ngo| ngo.id != chosen.id)
            .map(|ngo| score(*ngo))
            .collect();

        MatchResult {
            selected: Some(score(chosen)),
            alternatives,
            reasoning: reasoning.to_string(),
            confidence: RULE_BASED_CONFIDENCE,
            method: MatchMethod::RuleBased,
            proximity_enabled: false,
            total_nearby: 0,
        }
    }
}

impl Default for RuleBasedRanker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Ranker for RuleBasedRanker {
    async fn rank(&self, request: &MatchRequest, candidates: &[NgoCandidate]) -> Result<MatchResult> {
        Ok(self.rank_candidates(request, candidates))
    }

    fn name(&self) -> &str {
        "rule_based"
    }
}
