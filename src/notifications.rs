use serde::{Deserialize, Serialize};

use crate::core::{Donation, MatchResult, QualityLabel, ScoredCandidate};

/// Notification priority derived from donation quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn for_quality(quality: QualityLabel) -> Self {
        match quality {
            QualityLabel::ExpiresToday | QualityLabel::Expired => Priority::Urgent,
            QualityLabel::ExpiresSoon => Priority::High,
            QualityLabel::Fresh => Priority::Medium,
            QualityLabel::Unknown => Priority::Low,
        }
    }
}

/// "New donation" notice addressed to one matched NGO
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NgoNotification {
    pub ngo_id: i64,
    pub title: String,
    pub message: String,
    pub priority: Priority,
    pub match_score: f64,
}

/// Notices for the selected NGO and its first two alternates.
///
/// Donations that are expired or of unknown quality produce none.
pub fn plan_notifications(donation: &Donation, result: &MatchResult) -> Vec<NgoNotification> {
    if !donation.quality.is_matchable() {
        return Vec::new();
    }

    let priority = Priority::for_quality(donation.quality);
    result
        .notification_targets()
        .map(|candidate| NgoNotification {
            ngo_id: candidate.id(),
            title: format!("New Donation Available: {}", donation.food_name),
            message: notification_message(donation, candidate),
            priority,
            match_score: candidate.score,
        })
        .collect()
}

fn notification_message(donation: &Donation, candidate: &ScoredCandidate) -> String {
    let urgency = if donation.quality.is_urgent() {
        " URGENT PICKUP NEEDED"
    } else {
        ""
    };
    let greeting = if candidate.ngo.name.is_empty() {
        "Team"
    } else {
        candidate.ngo.name.as_str()
    };

    format!(
        "Hi {},\n\n\
         A new donation matches your capacity and needs:{}\n\n\
         {} - {} {}\n\
         Quality: {}\n\
         Expires: {}\n\
         Donor: {}\n\n\
         This donation was matched to your organization based on your capacity ({} units) and current needs.",
        greeting,
        urgency,
        donation.food_name,
        donation.quantity,
        donation.unit,
        donation.quality,
        donation.expiry_date,
        donation.donor_name.as_deref().unwrap_or("Anonymous"),
        candidate.ngo.capacity,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{NgoCandidate, Unit};
    use chrono::NaiveDate;

    fn donation(quality: QualityLabel) -> Donation {
        let expiry = NaiveDate::from_ymd_opt(2024, 6, 11).unwrap();
        Donation::new("Milk", 12, Unit::Liters, quality, expiry)
            .unwrap()
            .with_donor("Asha")
    }

    fn result_with(ids: &[i64]) -> MatchResult {
        let mut scored = ids
            .iter()
            .map(|&id| ScoredCandidate::new(NgoCandidate::new(id, format!("NGO {}", id), 20), 0.9, 1.0));
        let mut result = MatchResult::empty("");
        result.selected = scored.next();
        result.alternatives = scored.collect();
        result
    }

    #[test]
    fn test_priority_mapping() {
        assert_eq!(Priority::for_quality(QualityLabel::ExpiresToday), Priority::Urgent);
        assert_eq!(Priority::for_quality(QualityLabel::ExpiresSoon), Priority::High);
        assert_eq!(Priority::for_quality(QualityLabel::Fresh), Priority::Medium);
        assert_eq!(Priority::for_quality(QualityLabel::Unknown), Priority::Low);
    }

    #[test]
    fn test_selected_plus_two_alternates() {
        let notes = plan_notifications(&donation(QualityLabel::Fresh), &result_with(&[1, 2, 3, 4]));
        let ids: Vec<i64> = notes.iter().map(|n| n.ngo_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(notes[0].title, "New Donation Available: Milk");
        assert!(notes[0].message.starts_with("Hi NGO 1,"));
        assert!(notes[0].message.contains("Donor: Asha"));
        assert!(!notes[0].message.contains("URGENT"));
    }

    #[test]
    fn test_urgent_message() {
        let notes = plan_notifications(&donation(QualityLabel::ExpiresToday), &result_with(&[1]));
        assert_eq!(notes[0].priority, Priority::Urgent);
        assert!(notes[0].message.contains("URGENT PICKUP NEEDED"));
    }

    #[test]
    fn test_expired_donations_not_announced() {
        assert!(plan_notifications(&donation(QualityLabel::Expired), &result_with(&[1, 2])).is_empty());
        assert!(plan_notifications(&donation(QualityLabel::Fresh), &MatchResult::empty("none")).is_empty());
    }
}
