use rapidfuzz::distance::jaro_winkler;

use crate::core::GeoLocation;

/// Known city with its center coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnownPlace {
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

impl KnownPlace {
    /// City part of the name, e.g. "Pune" for "Pune, Maharashtra"
    pub fn city(&self) -> &'static str {
        self.name.split(',').next().unwrap_or(self.name).trim()
    }

    pub fn to_location(&self) -> GeoLocation {
        GeoLocation {
            latitude: self.latitude,
            longitude: self.longitude,
            address: self.name.to_string(),
            city: self.city().to_string(),
        }
    }
}

pub const KNOWN_PLACES: [KnownPlace; 10] = [
    KnownPlace { name: "Mumbai, Maharashtra", latitude: 19.0760, longitude: 72.8777 },
    KnownPlace { name: "Delhi, India", latitude: 28.7041, longitude: 77.1025 },
    KnownPlace { name: "Bangalore, Karnataka", latitude: 12.9716, longitude: 77.5946 },
    KnownPlace { name: "Chennai, Tamil Nadu", latitude: 13.0827, longitude: 80.2707 },
    KnownPlace { name: "Hyderabad, Telangana", latitude: 17.3850, longitude: 78.4867 },
    KnownPlace { name: "Pune, Maharashtra", latitude: 18.5204, longitude: 73.8567 },
    KnownPlace { name: "Kolkata, West Bengal", latitude: 22.5726, longitude: 88.3639 },
    KnownPlace { name: "Ahmedabad, Gujarat", latitude: 23.0225, longitude: 72.5714 },
    KnownPlace { name: "Jaipur, Rajasthan", latitude: 26.9124, longitude: 75.7873 },
    KnownPlace { name: "Surat, Gujarat", latitude: 21.1702, longitude: 72.8311 },
];

/// Minimum Jaro-Winkler similarity for a fuzzy city hit
const FUZZY_THRESHOLD: f64 = 0.75;

/// Suggest known places for a free-text city query.
///
/// Substring hits win; otherwise places are ranked by Jaro-Winkler similarity
/// of the query against the city name, keeping those above the threshold.
pub fn suggest_locations(query: &str, limit: usize) -> Vec<KnownPlace> {
    let query_lower = query.trim().to_lowercase();
    if query_lower.is_empty() {
        return KNOWN_PLACES.iter().copied().take(limit).collect();
    }

    let substring: Vec<KnownPlace> = KNOWN_PLACES
        .iter()
        .filter(|place| place.name.to_lowercase().contains(&query_lower))
        .copied()
        .take(limit)
        .collect();
    if !substring.is_empty() {
        return substring;
    }

    let mut fuzzy: Vec<(f64, KnownPlace)> = KNOWN_PLACES
        .iter()
        .map(|place| {
            let city_lower = place.city().to_lowercase();
            let score = jaro_winkler::normalized_similarity(query_lower.chars(), city_lower.chars());
            (score, *place)
        })
        .filter(|(score, _)| *score >= FUZZY_THRESHOLD)
        .collect();

    fuzzy.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    fuzzy.into_iter().take(limit).map(|(_, place)| place).collect()
}

/// Best single location for a city query
pub fn locate(query: &str) -> Option<GeoLocation> {
    if query.trim().is_empty() {
        return None;
    }
    suggest_locations(query, 1).first().map(KnownPlace::to_location)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_returns_first_places() {
        let places = suggest_locations("", 5);
        assert_eq!(places.len(), 5);
        assert_eq!(places[0].city(), "Mumbai");
    }

    #[test]
    fn test_substring_match() {
        let places = suggest_locations("gujarat", 5);
        let cities: Vec<&str> = places.iter().map(|p| p.city()).collect();
        assert_eq!(cities, vec!["Ahmedabad", "Surat"]);
    }

    #[test]
    fn test_fuzzy_match_handles_typos() {
        let places = suggest_locations("Banglore", 3);
        assert_eq!(places[0].city(), "Bangalore");
    }

    #[test]
    fn test_no_match() {
        assert!(suggest_locations("zzzzqqq", 3).is_empty());
        assert!(locate("zzzzqqq").is_none());
        assert!(locate("  ").is_none());
    }

    #[test]
    fn test_locate_builds_location() {
        let pune = locate("pune").unwrap();
        assert_eq!(pune.city, "Pune");
        assert_eq!(pune.latitude, 18.5204);
        assert!(pune.validate().is_ok());
    }
}
