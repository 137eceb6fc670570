use std::sync::Arc;
use std::time::Instant;

use crate::config::{AiSettings, MatchOptions};
use crate::core::{Donation, GeoLocation, MatchResult, NgoCandidate};
use crate::directory::CandidateProvider;
use crate::error::Result;
use crate::ranking::{AiRanker, CombinedRanker, MatchRequest, Ranker, RuleBasedRanker};

/// Matching orchestrator. Holds no per-request state, so one instance can
/// serve concurrent requests.
pub struct MatchEngine {
    directory: Arc<dyn CandidateProvider>,
    combined: CombinedRanker,
    ai: Option<Arc<dyn Ranker>>,
    fallback: RuleBasedRanker,
    options: MatchOptions,
}

impl MatchEngine {
    /// Engine without AI ranking
    pub fn new(directory: Arc<dyn CandidateProvider>, options: MatchOptions) -> Self {
        Self {
            directory,
            combined: CombinedRanker::new(),
            ai: None,
            fallback: RuleBasedRanker::new(),
            options,
        }
    }

    /// Engine that tries the AI ranker first when it can be configured
    pub fn with_ai_settings(
        directory: Arc<dyn CandidateProvider>,
        options: MatchOptions,
        settings: &AiSettings,
    ) -> Self {
        let engine = Self::new(directory, options);
        if !engine.options.ai_enabled {
            return engine;
        }

        match AiRanker::new(settings.clone()) {
            Ok(ai) => {
                tracing::info!("✅ AI ranker initialized ({})", settings.model);
                engine.with_ranker(Arc::new(ai))
            }
            Err(e) => {
                tracing::warn!("⚠️ AI ranker unavailable, using rule-based matching: {}", e);
                engine
            }
        }
    }

    /// Replace the AI-assisted strategy
    pub fn with_ranker(mut self, ranker: Arc<dyn Ranker>) -> Self {
        self.ai = Some(ranker);
        self
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    /// Build a request using the configured search radius
    pub fn request(&self, donation: Donation, donor_location: Option<GeoLocation>) -> MatchRequest {
        MatchRequest {
            donation,
            donor_location,
            max_distance_km: self.options.max_distance_km,
        }
    }

    /// Build and validate a request from caller input, optionally
    /// overriding the configured radius
    pub fn checked_request(
        &self,
        donation: Donation,
        donor_location: Option<GeoLocation>,
        max_distance_km: Option<f64>,
    ) -> Result<MatchRequest> {
        let mut request = self.request(donation, donor_location);
        if let Some(max) = max_distance_km {
            request = request.with_max_distance_km(max);
        }
        request.validate()?;
        Ok(request)
    }

    /// Current candidate set straight from the directory
    pub async fn candidates(&self, min_capacity: u32) -> Result<Vec<NgoCandidate>> {
        self.directory.get_candidates(min_capacity).await
    }

    /// Match a donation to an NGO.
    ///
    /// Never fails: a provider error or an empty directory yields a
    /// result with no selection and an explanation.
    pub async fn match_donation(&self, request: &MatchRequest) -> MatchResult {
        let start = Instant::now();

        let min_capacity = if self.options.require_full_capacity {
            request.donation.quantity.max(1)
        } else {
            1
        };

        let candidates = match self.directory.get_candidates(min_capacity).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!("Provider {} failed: {}", self.directory.name(), e);
                Vec::new()
            }
        };
        tracing::debug!(
            "Provider {} returned {} candidates (min capacity {})",
            self.directory.name(),
            candidates.len(),
            min_capacity
        );

        if candidates.is_empty() {
            return MatchResult::empty("No NGOs available");
        }

        let mut radius_note = None;
        if self.options.proximity_enabled && request.donor_location.is_some() {
            let result = if self.options.proximity_full_capacity {
                let quantity = request.donation.quantity;
                let able: Vec<NgoCandidate> = candidates
                    .iter()
                    .filter(|ngo| ngo.capacity >= quantity)
                    .cloned()
                    .collect();
                tracing::debug!("{} of {} NGOs can hold {} units", able.len(), candidates.len(), quantity);
                self.combined.rank_candidates(request, &able)
            } else {
                self.combined.rank_candidates(request, &candidates)
            };
            if result.is_matched() {
                self.log_match(request, &result, start);
                return result;
            }
            tracing::info!("{}, falling back", result.reasoning);
            radius_note = Some(result.reasoning);
        }

        let mut result = self.rank_without_location(request, &candidates).await;
        if let Some(note) = radius_note {
            result.proximity_enabled = true;
            result.total_nearby = 0;
            result.reasoning = format!("{}. {}", note, result.reasoning);
        }

        self.log_match(request, &result, start);
        result
    }

    async fn rank_without_location(
        &self,
        request: &MatchRequest,
        candidates: &[NgoCandidate],
    ) -> MatchResult {
        if let (true, Some(ai)) = (self.options.ai_enabled, self.ai.as_ref()) {
            match ai.rank(request, candidates).await {
                Ok(result) if result.is_matched() => return result,
                Ok(_) => tracing::warn!("Ranker {} made no selection", ai.name()),
                Err(e) => tracing::warn!("Ranker {} failed: {}", ai.name(), e),
            }
        }

        self.fallback.rank_candidates(request, candidates)
    }

    fn log_match(&self, request: &MatchRequest, result: &MatchResult, start: Instant) {
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
        tracing::info!(
            "✅ {} → {} ({:.2}ms)",
            request.donation.display(),
            result.display(),
            latency_ms
        );
    }
}
