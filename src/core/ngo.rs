use serde::{Deserialize, Serialize};

use crate::error::{MatchEngineError, Result};

/// Geographic coordinate pair plus descriptive address
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,

    #[serde(default)]
    pub address: String,

    #[serde(default)]
    pub city: String,
}

impl GeoLocation {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let location = Self {
            latitude,
            longitude,
            address: String::new(),
            city: String::new(),
        };
        location.validate()?;
        Ok(location)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(MatchEngineError::InvalidLocation(format!(
                "latitude {} out of range",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(MatchEngineError::InvalidLocation(format!(
                "longitude {} out of range",
                self.longitude
            )));
        }
        Ok(())
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = city.into();
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }
}

/// NGO eligible to receive a donation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NgoCandidate {
    pub id: i64,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub organization: String,

    /// Maximum units the NGO can currently accept
    pub capacity: u32,

    #[serde(default)]
    pub location: Option<GeoLocation>,

    #[serde(default)]
    pub specialization: Option<String>,
}

impl NgoCandidate {
    pub fn new(id: i64, name: impl Into<String>, capacity: u32) -> Self {
        Self {
            id,
            name: name.into(),
            organization: String::new(),
            capacity,
            location: None,
            specialization: None,
        }
    }

    pub fn with_location(mut self, location: GeoLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_specialization(mut self, specialization: impl Into<String>) -> Self {
        self.specialization = Some(specialization.into());
        self
    }

    /// Zero-capacity NGOs stay listed but are never picked
    pub fn can_accept(&self) -> bool {
        self.capacity > 0
    }

    pub fn city(&self) -> Option<&str> {
        self.location
            .as_ref()
            .map(|l| l.city.as_str())
            .filter(|c| !c.is_empty())
    }

    pub fn display_name(&self) -> String {
        match self.city() {
            Some(city) => format!("{} ({})", self.name, city),
            None => self.name.clone(),
        }
    }
}
