//! Great-circle distance and proximity scoring.

use crate::core::GeoLocation;
use crate::error::{MatchEngineError, Result};

/// Mean Earth radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometers between two points given in degrees
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1, lon1, lat2, lon2) = (
        lat1.to_radians(),
        lon1.to_radians(),
        lat2.to_radians(),
        lon2.to_radians(),
    );

    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);

    // clamp guards asin against a > 1.0 from rounding near antipodes
    2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
}

/// Distance between two locations in kilometers
pub fn distance_km(from: &GeoLocation, to: &GeoLocation) -> f64 {
    haversine_km(from.latitude, from.longitude, to.latitude, to.longitude)
}

/// Normalized closeness: 1.0 at the donor, 0.0 at or beyond `max_distance_km`.
///
/// Rounded to 3 decimals. Any distance inside the radius scores at least
/// 0.001 so rounding never turns an in-range NGO into a zero.
pub fn proximity_score(distance_km: f64, max_distance_km: f64) -> f64 {
    if !is_valid_radius(max_distance_km) || distance_km.is_nan() || distance_km >= max_distance_km {
        return 0.0;
    }
    let raw = 1.0 - (distance_km / max_distance_km);
    round_to(raw, 3).max(0.001)
}

/// A search radius must be a finite number of kilometers above zero
pub fn is_valid_radius(max_distance_km: f64) -> bool {
    max_distance_km.is_finite() && max_distance_km > 0.0
}

/// Check a caller-supplied search radius
pub fn validate_radius(max_distance_km: f64) -> Result<f64> {
    if is_valid_radius(max_distance_km) {
        Ok(max_distance_km)
    } else {
        Err(MatchEngineError::InvalidLocation(format!(
            "Search radius must be a positive number of km, got {}",
            max_distance_km
        )))
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Distance bucket used in reasoning text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceTier {
    VeryClose,
    Convenient,
    Reasonable,
}

impl DistanceTier {
    pub fn of(distance_km: f64) -> Self {
        if distance_km < 5.0 {
            DistanceTier::VeryClose
        } else if distance_km < 15.0 {
            DistanceTier::Convenient
        } else {
            DistanceTier::Reasonable
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DistanceTier::VeryClose => "Very close",
            DistanceTier::Convenient => "Convenient",
            DistanceTier::Reasonable => "Reasonable",
        }
    }

    pub fn reason(&self, distance_km: f64) -> String {
        match self {
            DistanceTier::VeryClose => format!("Very close location ({}km away)", distance_km),
            DistanceTier::Convenient => format!("Convenient pickup distance ({}km)", distance_km),
            DistanceTier::Reasonable => format!("Within reasonable distance ({}km)", distance_km),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MUMBAI: (f64, f64) = (19.0760, 72.8777);
    const PUNE: (f64, f64) = (18.5204, 73.8567);

    #[test]
    fn test_mumbai_to_pune() {
        let distance = haversine_km(MUMBAI.0, MUMBAI.1, PUNE.0, PUNE.1);
        assert!(distance > 115.0 && distance < 122.0, "got {}", distance);

        let score = proximity_score(distance, 200.0);
        assert!(score > 0.39 && score < 0.42, "got {}", score);
    }

    #[test]
    fn test_distance_symmetry() {
        let points = [MUMBAI, PUNE, (28.7041, 77.1025), (-33.8688, 151.2093), (0.0, 0.0)];
        for a in points {
            for b in points {
                let ab = haversine_km(a.0, a.1, b.0, b.1);
                let ba = haversine_km(b.0, b.1, a.0, a.1);
                assert!((ab - ba).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_distance_zero_identity() {
        assert_eq!(haversine_km(PUNE.0, PUNE.1, PUNE.0, PUNE.1), 0.0);
        assert_eq!(proximity_score(0.0, 25.0), 1.0);
    }

    #[test]
    fn test_antipodes_are_finite() {
        let distance = haversine_km(0.0, 0.0, 0.0, 180.0);
        assert!(distance.is_finite());
        assert!((distance - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn test_proximity_boundary() {
        assert_eq!(proximity_score(25.0, 25.0), 0.0);
        assert_eq!(proximity_score(40.0, 25.0), 0.0);
        assert!(proximity_score(24.9999, 25.0) > 0.0);
        assert_eq!(proximity_score(12.5, 25.0), 0.5);

        let mut d = 0.0;
        while d < 25.0 {
            assert!(proximity_score(d, 25.0) > 0.0);
            d += 0.01;
        }
    }

    #[test]
    fn test_proximity_degenerate_radius() {
        assert_eq!(proximity_score(120.0, f64::NAN), 0.0);
        assert_eq!(proximity_score(120.0, f64::INFINITY), 0.0);
        assert_eq!(proximity_score(f64::NAN, 25.0), 0.0);
        assert_eq!(proximity_score(0.0, 0.0), 0.0);
        assert_eq!(proximity_score(0.0, -5.0), 0.0);
    }

    #[test]
    fn test_validate_radius() {
        assert_eq!(validate_radius(25.0).unwrap(), 25.0);
        assert_eq!(validate_radius(0.5).unwrap(), 0.5);
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 0.0, -5.0] {
            assert!(matches!(validate_radius(bad), Err(MatchEngineError::InvalidLocation(_))));
        }
    }

    #[test]
    fn test_distance_tier() {
        assert_eq!(DistanceTier::of(4.26), DistanceTier::VeryClose);
        assert_eq!(DistanceTier::of(5.0), DistanceTier::Convenient);
        assert_eq!(DistanceTier::of(15.0), DistanceTier::Reasonable);
        assert_eq!(DistanceTier::of(2.0).reason(2.0), "Very close location (2km away)");
    }
}
