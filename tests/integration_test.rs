use chrono::NaiveDate;
use foodbridge_match_engine::{
    plan_notifications, scoring, CandidateProvider, Donation, GeoLocation, MatchEngine, MatchMethod,
    MatchOptions, NewNgo, QualityLabel, SqliteDirectory, Unit,
};
use std::sync::Arc;

fn donation(quantity: u32) -> Donation {
    let expiry = NaiveDate::from_ymd_opt(2024, 6, 20).unwrap();
    Donation::new("Rice", quantity, Unit::Kg, QualityLabel::Fresh, expiry).unwrap()
}

async fn directory_with(capacities: &[u32]) -> Arc<SqliteDirectory> {
    let directory = SqliteDirectory::new(":memory:").await.unwrap();
    for (i, &capacity) in capacities.iter().enumerate() {
        directory
            .register(&NewNgo::new(format!("NGO {}", i + 1), capacity))
            .await
            .unwrap();
    }
    Arc::new(directory)
}

#[tokio::test]
async fn test_large_donation_goes_to_highest_capacity() {
    let directory = directory_with(&[100, 40, 10]).await;
    let engine = MatchEngine::new(directory, MatchOptions::default());

    let result = engine.match_donation(&engine.request(donation(60), None)).await;

    let selected = result.selected.as_ref().unwrap();
    assert_eq!(selected.id(), 1);
    assert_eq!(selected.ngo.capacity, 100);
    let alternatives: Vec<i64> = result.alternatives.iter().map(|c| c.id()).collect();
    assert_eq!(alternatives, vec![2, 3]);
    assert_eq!(result.method, MatchMethod::RuleBased);
    assert_eq!(result.confidence, 0.7);
}

#[tokio::test]
async fn test_mumbai_donor_matches_pune_ngo() {
    let directory = SqliteDirectory::new(":memory:").await.unwrap();
    let pune = GeoLocation::new(18.5204, 73.8567).unwrap().with_city("Pune");
    directory
        .register(&NewNgo::new("Pune Food Bank", 80).with_location(pune))
        .await
        .unwrap();
    // no location, must not take part in proximity ranking
    directory.register(&NewNgo::new("Unlocated", 500)).await.unwrap();

    let engine = MatchEngine::new(Arc::new(directory), MatchOptions::default());
    let donor = GeoLocation::new(19.0760, 72.8777).unwrap();
    let request = engine.request(donation(50), Some(donor)).with_max_distance_km(200.0);

    let result = engine.match_donation(&request).await;

    assert_eq!(result.method, MatchMethod::Proximity);
    assert!(result.proximity_enabled);
    assert_eq!(result.total_nearby, 1);

    let selected = result.selected.as_ref().unwrap();
    assert_eq!(selected.ngo.name, "Pune Food Bank");
    let distance = selected.distance_km.unwrap();
    assert!(distance > 115.0 && distance < 122.0, "distance {}", distance);
    let proximity = selected.proximity_score.unwrap();
    assert!((proximity - 0.40).abs() < 0.02, "proximity {}", proximity);
    assert_eq!(selected.capacity_score, 1.0);
    assert!((selected.score - 0.64).abs() < 0.01, "score {}", selected.score);
    assert!(result.alternatives.is_empty());
    assert!(result.reasoning.starts_with("Selected Pune Food Bank as the best match"));
}

#[tokio::test]
async fn test_small_donation_goes_to_smallest_ngo() {
    let directory = directory_with(&[20, 90, 5, 50]).await;
    let engine = MatchEngine::new(directory, MatchOptions::default());

    let result = engine.match_donation(&engine.request(donation(15), None)).await;

    assert_eq!(result.selected.as_ref().unwrap().ngo.capacity, 5);
    let alternatives: Vec<u32> = result.alternatives.iter().map(|c| c.ngo.capacity).collect();
    assert_eq!(alternatives, vec![90, 50, 20]);
}

#[tokio::test]
async fn test_empty_directory() {
    let directory = directory_with(&[]).await;
    let engine = MatchEngine::new(directory, MatchOptions::default());

    let donor = scoring::locate("Mumbai");
    let result = engine.match_donation(&engine.request(donation(10), donor)).await;

    assert!(result.selected.is_none());
    assert!(result.alternatives.is_empty());
    assert_eq!(result.reasoning, "No NGOs available");
}

#[tokio::test]
async fn test_deactivated_and_empty_ngos_are_skipped() {
    let directory = directory_with(&[100, 40, 0]).await;
    directory.deactivate(1).await.unwrap();

    let candidates = directory.get_candidates(0).await.unwrap();
    let ids: Vec<i64> = candidates.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![2, 3]);

    let engine = MatchEngine::new(directory, MatchOptions::default());
    let result = engine.match_donation(&engine.request(donation(60), None)).await;

    assert_eq!(result.selected.as_ref().unwrap().id(), 2);
    assert!(result.alternatives.is_empty());
}

#[tokio::test]
async fn test_require_full_capacity() {
    let directory = directory_with(&[100, 40, 10]).await;
    let options = MatchOptions {
        require_full_capacity: true,
        ..MatchOptions::default()
    };
    let engine = MatchEngine::new(directory, options);

    let result = engine.match_donation(&engine.request(donation(30), None)).await;
    let selected = result.selected.as_ref().unwrap();
    assert!(selected.ngo.capacity >= 30);
    assert!(result.alternatives.iter().all(|c| c.ngo.capacity >= 30));

    let none = engine.match_donation(&engine.request(donation(150), None)).await;
    assert!(none.selected.is_none());
}

#[tokio::test]
async fn test_far_donor_falls_back_to_rules() {
    let directory = SqliteDirectory::new(":memory:").await.unwrap();
    let pune = scoring::locate("Pune").unwrap();
    directory
        .register(&NewNgo::new("Pune Food Bank", 80).with_location(pune))
        .await
        .unwrap();

    let engine = MatchEngine::new(Arc::new(directory), MatchOptions::default());
    let donor = scoring::locate("Delhi");
    let result = engine.match_donation(&engine.request(donation(50), donor)).await;

    assert_eq!(result.method, MatchMethod::RuleBased);
    assert!(result.proximity_enabled);
    assert_eq!(result.total_nearby, 0);
    assert!(result.reasoning.contains("No NGOs found within 25km radius"));
    assert_eq!(result.selected.unwrap().ngo.name, "Pune Food Bank");
}

#[tokio::test]
async fn test_match_then_notify() {
    let directory = directory_with(&[100, 60, 40, 20, 10]).await;
    let engine = MatchEngine::new(directory, MatchOptions::default());

    let request = engine.request(donation(60), None);
    let result = engine.match_donation(&request).await;
    let notifications = plan_notifications(&request.donation, &result);

    let ids: Vec<i64> = notifications.iter().map(|n| n.ngo_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert!(notifications.iter().all(|n| n.title == "New Donation Available: Rice"));
}

#[tokio::test]
async fn test_concurrent_matches_share_engine() {
    let directory = directory_with(&[100, 40, 10]).await;
    let engine = Arc::new(MatchEngine::new(directory, MatchOptions::default()));

    let handles: Vec<_> = [60, 25, 5]
        .into_iter()
        .map(|quantity| {
            let engine = engine.clone();
            tokio::spawn(async move { engine.match_donation(&engine.request(donation(quantity), None)).await })
        })
        .collect();

    let mut selected = Vec::new();
    for handle in handles {
        selected.push(handle.await.unwrap().selected.unwrap().ngo.capacity);
    }
    assert_eq!(selected, vec![100, 40, 10]);
}

#[tokio::test]
async fn test_nearby_ngo_must_hold_the_donation() {
    let directory = SqliteDirectory::new(":memory:").await.unwrap();
    let next_door = GeoLocation::new(19.0761, 72.8778).unwrap().with_city("Mumbai");
    let across_town = GeoLocation::new(19.1980, 72.8900).unwrap().with_city("Mumbai");
    directory
        .register(&NewNgo::new("Corner Kitchen", 10).with_location(next_door))
        .await
        .unwrap();
    directory
        .register(&NewNgo::new("City Food Bank", 80).with_location(across_town))
        .await
        .unwrap();

    let engine = MatchEngine::new(Arc::new(directory), MatchOptions::default());
    let donor = scoring::locate("Mumbai");
    let result = engine.match_donation(&engine.request(donation(60), donor)).await;

    assert_eq!(result.method, MatchMethod::Proximity);
    let selected = result.selected.as_ref().unwrap();
    assert_eq!(selected.ngo.name, "City Food Bank");
    assert!(selected.distance_km.unwrap() < 25.0);
    assert!(result.alternatives.iter().all(|c| c.ngo.capacity >= 60));
}

#[tokio::test]
async fn test_invalid_radius_rejected_at_the_boundary() {
    let directory = directory_with(&[100]).await;
    let engine = MatchEngine::new(directory, MatchOptions::default());

    for bad in [f64::NAN, f64::INFINITY, 0.0, -5.0] {
        let result = engine.checked_request(donation(10), scoring::locate("Mumbai"), Some(bad));
        assert!(result.is_err(), "radius {}", bad);
    }
    assert!(engine.checked_request(donation(10), None, Some(50.0)).is_ok());
}
