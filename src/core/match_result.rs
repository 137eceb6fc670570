use serde::{Deserialize, Serialize};
use crate::core::NgoCandidate;

/// Maximum number of alternates carried by a result
pub const MAX_ALTERNATIVES: usize = 3;

/// Strategy that produced a match result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    /// Proximity + capacity blend
    Proximity,
    /// Capacity fit only (no donor location)
    CapacityOnly,
    /// AI-assisted recommendation
    Ai,
    /// Rule-based fallback
    RuleBased,
    /// Nothing to select from
    None,
}

impl MatchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMethod::Proximity => "proximity",
            MatchMethod::CapacityOnly => "capacity_only",
            MatchMethod::Ai => "ai",
            MatchMethod::RuleBased => "rule_based",
            MatchMethod::None => "none",
        }
    }
}

/// Candidate with its scores for one matching call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredCandidate {
    pub ngo: NgoCandidate,

    /// Ranking score (0.0 - 1.0)
    pub score: f64,

    pub capacity_score: f64,

    #[serde(default)]
    pub proximity_score: Option<f64>,

    #[serde(default)]
    pub distance_km: Option<f64>,

    #[serde(default)]
    pub match_reasons: Vec<String>,
}

impl ScoredCandidate {
    pub fn new(ngo: NgoCandidate, score: f64, capacity_score: f64) -> Self {
        Self {
            ngo,
            score,
            capacity_score,
            proximity_score: None,
            distance_km: None,
            match_reasons: Vec::new(),
        }
    }

    pub fn id(&self) -> i64 {
        self.ngo.id
    }
}

/// Outcome of one matching invocation. Not persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchResult {
    /// Best NGO, `None` when nothing is eligible
    pub selected: Option<ScoredCandidate>,

    /// Up to three runners-up, never containing `selected`
    #[serde(default)]
    pub alternatives: Vec<ScoredCandidate>,

    pub reasoning: String,

    /// Confidence of the producing strategy (0.0 - 1.0)
    pub confidence: f64,

    pub method: MatchMethod,

    pub proximity_enabled: bool,

    /// Candidates that survived the radius filter
    #[serde(default)]
    pub total_nearby: usize,
}

impl MatchResult {
    /// Terminal state for an empty candidate set
    pub fn empty(reasoning: impl Into<String>) -> Self {
        Self {
            selected: None,
            alternatives: Vec::new(),
            reasoning: reasoning.into(),
            confidence: 0.0,
            method: MatchMethod::None,
            proximity_enabled: false,
            total_nearby: 0,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.selected.is_some()
    }

    /// Selected NGO followed by the first two alternates
    pub fn notification_targets(&self) -> impl Iterator<Item = &ScoredCandidate> {
        self.selected.iter().chain(self.alternatives.iter().take(2))
    }

    /// Get display string for logging
    pub fn display(&self) -> String {
        match &self.selected {
            Some(best) => format!(
                "{} - {:.3} [{}] +{} alternatives",
                best.ngo.display_name(),
                best.score,
                self.method.as_str(),
                self.alternatives.len()
            ),
            None => format!("no match [{}]: {}", self.method.as_str(), self.reasoning),
        }
    }
}
