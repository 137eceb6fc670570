pub mod capacity;
pub mod geo;
pub mod proximity;

pub use capacity::{capacity_score, CapacityTier};
pub use geo::{locate, suggest_locations, KnownPlace, KNOWN_PLACES};
pub use proximity::{
    distance_km, haversine_km, is_valid_radius, proximity_score, validate_radius, DistanceTier,
    EARTH_RADIUS_KM,
};

pub(crate) use proximity::round_to;
