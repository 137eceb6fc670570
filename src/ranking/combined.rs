use async_trait::async_trait;
use std::cmp::Ordering;

use crate::core::{
    Donation, GeoLocation, MatchMethod, MatchResult, NgoCandidate, ScoredCandidate,
    MAX_ALTERNATIVES,
};
use crate::error::Result;
use crate::ranking::{eligible, MatchRequest, Ranker};
use crate::scoring::{
    capacity_score, distance_km, is_valid_radius, proximity_score, round_to, CapacityTier,
    DistanceTier,
};

/// Weight of the proximity score in the combined score
pub const PROXIMITY_WEIGHT: f64 = 0.6;
/// Weight of the capacity score in the combined score
pub const CAPACITY_WEIGHT: f64 = 0.4;

/// Blends proximity and capacity fit; capacity only without a donor location
pub struct CombinedRanker;

impl CombinedRanker {
    pub fn new() -> Self {
        Self
    }

    /// Deterministic ranking, no I/O
    pub fn rank_candidates(&self, request: &MatchRequest, candidates: &[NgoCandidate]) -> MatchResult {
        match &request.donor_location {
            Some(donor) => self.rank_by_proximity(request, donor, candidates),
            None => self.rank_by_capacity(&request.donation, candidates),
        }
    }

    fn rank_by_proximity(
        &self,
        request: &MatchRequest,
        donor: &GeoLocation,
        candidates: &[NgoCandidate],
    ) -> MatchResult {
        let donation = &request.donation;
        let max_distance = request.max_distance_km;
        if !is_valid_radius(max_distance) {
            tracing::warn!("Ignoring invalid search radius {}", max_distance);
        }

        let mut scored: Vec<ScoredCandidate> = eligible(candidates)
            .filter_map(|ngo| {
                let location = ngo.location.as_ref()?;
                let distance = distance_km(donor, location);
                if !is_valid_radius(max_distance) || distance.is_nan() || distance > max_distance {
                    return None;
                }

                let proximity = proximity_score(distance, max_distance);
                let capacity = capacity_score(ngo.capacity, donation.quantity);
                let combined = combined_score(proximity, capacity);

                let mut candidate = ScoredCandidate::new(ngo.clone(), combined, capacity);
                candidate.distance_km = Some(round_to(distance, 2));
                candidate.proximity_score = Some(proximity);
                candidate.match_reasons = match_reasons(&candidate, donation);
                Some(candidate)
            })
            .collect();

        let total_nearby = scored.len();
        tracing::debug!("{} NGOs within {}km of donor", total_nearby, max_distance);

        if scored.is_empty() {
            let mut result =
                MatchResult::empty(format!("No NGOs found within {}km radius", max_distance));
            result.method = MatchMethod::Proximity;
            result.proximity_enabled = true;
            return result;
        }

        scored.sort_by(compare_with_distance);
        let mut ranked = scored.into_iter();
        let selected = ranked.next();
        let alternatives: Vec<ScoredCandidate> = ranked.take(MAX_ALTERNATIVES).collect();

        let reasoning = selected
            .as_ref()
            .map(|best| proximity_reasoning(best, donation))
            .unwrap_or_default();
        let confidence = selected.as_ref().map(|best| best.score).unwrap_or(0.0);

        MatchResult {
            selected,
            alternatives,
            reasoning,
            confidence,
            method: MatchMethod::Proximity,
            proximity_enabled: true,
            total_nearby,
        }
    }

    fn rank_by_capacity(&self, donation: &Donation, candidates: &[NgoCandidate]) -> MatchResult {
        let mut scored: Vec<ScoredCandidate> = eligible(candidates)
            .map(|ngo| {
                let capacity = capacity_score(ngo.capacity, donation.quantity);
                let mut candidate = ScoredCandidate::new(ngo.clone(), capacity, capacity);
                candidate.match_reasons = match_reasons(&candidate, donation);
                candidate
            })
            .collect();

        if scored.is_empty() {
            return MatchResult::empty("No NGOs available");
        }

        scored.sort_by(compare_with_distance);
        let mut ranked = scored.into_iter();
        let selected = ranked.next();
        let alternatives: Vec<ScoredCandidate> = ranked.take(MAX_ALTERNATIVES).collect();

        let reasoning = selected
            .as_ref()
            .map(|best| capacity_reasoning(best, donation))
            .unwrap_or_default();
        let confidence = selected.as_ref().map(|best| best.score).unwrap_or(0.0);

        MatchResult {
            selected,
            alternatives,
            reasoning,
            confidence,
            method: MatchMethod::CapacityOnly,
            proximity_enabled: false,
            total_nearby: 0,
        }
    }
}

impl Default for CombinedRanker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Ranker for CombinedRanker {
    async fn rank(&self, request: &MatchRequest, candidates: &[NgoCandidate]) -> Result<MatchResult> {
        Ok(self.rank_candidates(request, candidates))
    }

    fn name(&self) -> &str {
        "combined"
    }
}

/// Weighted blend, rounded to 3 decimals
pub fn combined_score(proximity_score: f64, capacity_score: f64) -> f64 {
    round_to(
        proximity_score * PROXIMITY_WEIGHT + capacity_score * CAPACITY_WEIGHT,
        3,
    )
}

/// Score desc, distance asc, capacity desc, id asc
fn compare_with_distance(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| match (a.distance_km, b.distance_km) {
            (Some(da), Some(db)) => da.total_cmp(&db),
            _ => Ordering::Equal,
        })
        .then_with(|| b.ngo.capacity.cmp(&a.ngo.capacity))
        .then_with(|| a.ngo.id.cmp(&b.ngo.id))
}

fn match_reasons(candidate: &ScoredCandidate, donation: &Donation) -> Vec<String> {
    let mut reasons = Vec::new();

    if let Some(distance) = candidate.distance_km {
        reasons.push(DistanceTier::of(distance).reason(distance));
    }

    let capacity = candidate.ngo.capacity;
    if let Some(reason) = CapacityTier::of(capacity, donation.quantity).reason(capacity) {
        reasons.push(reason);
    }

    if let Some(city) = candidate.ngo.city() {
        reasons.push(format!("Located in {}", city));
    }

    reasons
}

fn proximity_reasoning(best: &ScoredCandidate, donation: &Donation) -> String {
    let distance = best.distance_km.unwrap_or_default();
    let capacity = best.ngo.capacity;

    format!(
        "Selected {} as the best match for your {} donation ({} {}):\n\
         Match score: {:.2}/1.0\n\
         Distance: {}km - {} pickup location\n\
         Capacity: {} units - {} capacity match\n\
         Location: {}\n\
         This NGO offers the best combination of proximity and capacity for efficient food distribution.",
        best.ngo.name,
        donation.food_name,
        donation.quantity,
        donation.unit,
        best.score,
        distance,
        DistanceTier::of(distance).label(),
        capacity,
        CapacityTier::of(capacity, donation.quantity).label(),
        best.ngo.city().unwrap_or("Unknown city"),
    )
}

fn capacity_reasoning(best: &ScoredCandidate, donation: &Donation) -> String {
    let capacity = best.ngo.capacity;

    format!(
        "Selected {} as the best match for your {} donation ({} {}):\n\
         Match score: {:.2}/1.0\n\
         Capacity: {} units - {} capacity match\n\
         Location-based matching not available; ranked by capacity fit only.",
        best.ngo.name,
        donation.food_name,
        donation.quantity,
        donation.unit,
        best.score,
        capacity,
        CapacityTier::of(capacity, donation.quantity).label(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{QualityLabel, Unit};
    use chrono::NaiveDate;

    fn donation(quantity: u32) -> Donation {
        let expiry = NaiveDate::from_ymd_opt(2024, 6, 20).unwrap();
        Donation::new("Rice", quantity, Unit::Kg, QualityLabel::Fresh, expiry).unwrap()
    }

    fn at(lat: f64, lon: f64, city: &str) -> GeoLocation {
        GeoLocation::new(lat, lon).unwrap().with_city(city)
    }

    fn mumbai() -> GeoLocation {
        at(19.0760, 72.8777, "Mumbai")
    }

    #[test]
    fn test_mumbai_donor_pune_ngo() {
        let ngo = NgoCandidate::new(1, "Pune Food Bank", 100).with_location(at(18.5204, 73.8567, "Pune"));
        // capacity 100 >= 60 and <= 120 -> capacity score 1.0
        let request = MatchRequest::new(donation(60))
            .with_donor_location(mumbai())
            .with_max_distance_km(200.0);

        let result = CombinedRanker::new().rank_candidates(&request, &[ngo]);
        let best = result.selected.unwrap();

        let distance = best.distance_km.unwrap();
        assert!(distance > 115.0 && distance < 122.0, "got {}", distance);
        assert_eq!(best.capacity_score, 1.0);
        assert!((best.score - 0.64).abs() < 0.01, "got {}", best.score);
        assert_eq!(result.method, MatchMethod::Proximity);
        assert!(result.proximity_enabled);
        assert_eq!(result.total_nearby, 1);
    }

    #[test]
    fn test_proximity_outweighs_capacity() {
        let near = NgoCandidate::new(1, "Near", 500).with_location(at(19.0800, 72.8800, "Mumbai"));
        let far = NgoCandidate::new(2, "Far", 30).with_location(at(19.2183, 72.9781, "Thane"));
        let request = MatchRequest::new(donation(20)).with_donor_location(mumbai());

        let result = CombinedRanker::new().rank_candidates(&request, &[far, near]);
        assert_eq!(result.selected.unwrap().id(), 1);
        assert_eq!(result.alternatives.len(), 1);
        assert_eq!(result.alternatives[0].id(), 2);
    }

    #[test]
    fn test_out_of_radius_and_unlocated_excluded() {
        let pune = NgoCandidate::new(1, "Pune", 50).with_location(at(18.5204, 73.8567, "Pune"));
        let unknown = NgoCandidate::new(2, "Nowhere", 50);
        let request = MatchRequest::new(donation(20)).with_donor_location(mumbai());

        let result = CombinedRanker::new().rank_candidates(&request, &[pune, unknown]);
        assert!(result.selected.is_none());
        assert!(result.alternatives.is_empty());
        assert!(result.proximity_enabled);
        assert_eq!(result.total_nearby, 0);
        assert_eq!(result.reasoning, "No NGOs found within 25km radius");
    }

    #[test]
    fn test_degenerate_radius_finds_nobody() {
        let pune = NgoCandidate::new(1, "Pune", 100).with_location(at(18.5204, 73.8567, "Pune"));
        let next_door = NgoCandidate::new(2, "Next door", 100).with_location(mumbai());

        for radius in [f64::NAN, f64::INFINITY, 0.0, -5.0] {
            let request = MatchRequest::new(donation(60))
                .with_donor_location(mumbai())
                .with_max_distance_km(radius);
            let result = CombinedRanker::new().rank_candidates(&request, &[pune.clone(), next_door.clone()]);
            assert!(result.selected.is_none(), "radius {}", radius);
            assert_eq!(result.total_nearby, 0);
        }
    }

    #[test]
    fn test_ties_broken_by_distance_then_capacity_then_id() {
        let spot = at(19.0800, 72.8800, "Mumbai");
        let candidates = vec![
            NgoCandidate::new(7, "B", 40).with_location(spot.clone()),
            NgoCandidate::new(3, "A", 40).with_location(spot.clone()),
            NgoCandidate::new(5, "C", 35).with_location(spot),
        ];
        let request = MatchRequest::new(donation(20)).with_donor_location(mumbai());

        let result = CombinedRanker::new().rank_candidates(&request, &candidates);
        let order: Vec<i64> = result
            .selected
            .iter()
            .chain(result.alternatives.iter())
            .map(|c| c.id())
            .collect();
        assert_eq!(order, vec![3, 7, 5]);
    }

    #[test]
    fn test_ranking_is_deterministic() {
        let candidates: Vec<NgoCandidate> = (1..=20)
            .map(|i| {
                NgoCandidate::new(i, format!("NGO {}", i), (i as u32 % 7) * 15)
                    .with_location(at(19.0 + (i % 5) as f64 * 0.01, 72.9, "Mumbai"))
            })
            .collect();
        let request = MatchRequest::new(donation(30)).with_donor_location(mumbai());
        let ranker = CombinedRanker::new();

        let first = ranker.rank_candidates(&request, &candidates);
        for _ in 0..10 {
            assert_eq!(ranker.rank_candidates(&request, &candidates), first);
        }
    }

    #[test]
    fn test_alternatives_capped_and_zero_capacity_skipped() {
        let spot = at(19.0800, 72.8800, "Mumbai");
        let mut candidates: Vec<NgoCandidate> = (1..=6)
            .map(|i| NgoCandidate::new(i, format!("NGO {}", i), 40).with_location(spot.clone()))
            .collect();
        candidates.push(NgoCandidate::new(99, "Full", 0).with_location(spot));
        let request = MatchRequest::new(donation(20)).with_donor_location(mumbai());

        let result = CombinedRanker::new().rank_candidates(&request, &candidates);
        assert_eq!(result.alternatives.len(), MAX_ALTERNATIVES);
        assert_eq!(result.total_nearby, 6);
        let selected = result.selected.unwrap();
        assert_ne!(selected.id(), 99);
        assert!(result.alternatives.iter().all(|c| c.id() != 99 && c.id() != selected.id()));
    }

    #[test]
    fn test_capacity_only_without_donor_location() {
        let candidates = vec![
            NgoCandidate::new(1, "Huge", 500),
            NgoCandidate::new(2, "Snug", 35),
            NgoCandidate::new(3, "Tiny", 15),
        ];
        let request = MatchRequest::new(donation(20));

        let result = CombinedRanker::new().rank_candidates(&request, &candidates);
        let best = result.selected.unwrap();
        assert_eq!(best.id(), 2);
        assert_eq!(best.score, 1.0);
        assert_eq!(result.method, MatchMethod::CapacityOnly);
        assert!(!result.proximity_enabled);
        assert!(result.reasoning.contains("capacity fit only"));
    }

    #[test]
    fn test_reasoning_mentions_tiers() {
        let ngo = NgoCandidate::new(1, "Andheri Helpers", 50).with_location(at(19.1136, 72.8697, "Mumbai"));
        let request = MatchRequest::new(donation(20)).with_donor_location(mumbai());

        let result = CombinedRanker::new().rank_candidates(&request, &[ngo]);
        assert!(result.reasoning.starts_with("Selected Andheri Helpers as the best match for your Rice donation (20 kg)"));
        assert!(result.reasoning.contains("Very close pickup location"));
        assert!(result.reasoning.contains("Excellent capacity match"));

        let reasons = &result.selected.unwrap().match_reasons;
        assert!(reasons[0].starts_with("Very close location"));
        assert_eq!(reasons[1], "High capacity (50 units)");
        assert_eq!(reasons[2], "Located in Mumbai");
    }

    #[test]
    fn test_combined_score_weights() {
        assert_eq!(combined_score(1.0, 1.0), 1.0);
        assert_eq!(combined_score(0.0, 0.3), 0.12);
        assert_eq!(combined_score(0.5, 0.8), 0.62);
    }
}
