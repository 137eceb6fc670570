use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{MatchEngineError, Result};

/// Measurement unit for a donated quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Kg,
    Grams,
    Pounds,
    Liters,
    Ml,
    Gallons,
    Pieces,
    Packets,
    Boxes,
    Cans,
    Bottles,
    Bags,
}

impl Unit {
    pub const ALL: [Unit; 12] = [
        Unit::Kg,
        Unit::Grams,
        Unit::Pounds,
        Unit::Liters,
        Unit::Ml,
        Unit::Gallons,
        Unit::Pieces,
        Unit::Packets,
        Unit::Boxes,
        Unit::Cans,
        Unit::Bottles,
        Unit::Bags,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Kg => "kg",
            Unit::Grams => "grams",
            Unit::Pounds => "pounds",
            Unit::Liters => "liters",
            Unit::Ml => "ml",
            Unit::Gallons => "gallons",
            Unit::Pieces => "pieces",
            Unit::Packets => "packets",
            Unit::Boxes => "boxes",
            Unit::Cans => "cans",
            Unit::Bottles => "bottles",
            Unit::Bags => "bags",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = MatchEngineError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Unit::ALL
            .iter()
            .copied()
            .find(|unit| unit.as_str() == wanted)
            .ok_or_else(|| MatchEngineError::InvalidDonation(format!("Unknown unit: {}", s)))
    }
}

/// Quality label assigned to a donation before matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QualityLabel {
    #[serde(rename = "Fresh")]
    Fresh,
    #[serde(rename = "Expires Soon")]
    ExpiresSoon,
    #[serde(rename = "Expires Today")]
    ExpiresToday,
    #[serde(rename = "Expired")]
    Expired,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl QualityLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityLabel::Fresh => "Fresh",
            QualityLabel::ExpiresSoon => "Expires Soon",
            QualityLabel::ExpiresToday => "Expires Today",
            QualityLabel::Expired => "Expired",
            QualityLabel::Unknown => "Unknown",
        }
    }

    /// Only these labels are offered to NGOs
    pub fn is_matchable(&self) -> bool {
        matches!(
            self,
            QualityLabel::Fresh | QualityLabel::ExpiresSoon | QualityLabel::ExpiresToday
        )
    }

    pub fn is_urgent(&self) -> bool {
        matches!(self, QualityLabel::ExpiresSoon | QualityLabel::ExpiresToday)
    }
}

impl fmt::Display for QualityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QualityLabel {
    type Err = MatchEngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "fresh" => Ok(QualityLabel::Fresh),
            "expires soon" => Ok(QualityLabel::ExpiresSoon),
            "expires today" => Ok(QualityLabel::ExpiresToday),
            // image model vocabulary
            "expired" | "spoiled" => Ok(QualityLabel::Expired),
            "unknown" => Ok(QualityLabel::Unknown),
            other => Err(MatchEngineError::InvalidDonation(format!(
                "Unknown quality label: {}",
                other
            ))),
        }
    }
}

/// Snapshot of one offered food item, validated once at construction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Donation {
    pub food_name: String,
    pub quantity: u32,
    pub unit: Unit,
    pub quality: QualityLabel,
    pub expiry_date: NaiveDate,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub donor_name: Option<String>,
}

impl Donation {
    pub fn new(
        food_name: impl Into<String>,
        quantity: u32,
        unit: Unit,
        quality: QualityLabel,
        expiry_date: NaiveDate,
    ) -> Result<Self> {
        let donation = Self {
            food_name: food_name.into(),
            quantity,
            unit,
            quality,
            expiry_date,
            description: None,
            donor_name: None,
        };
        donation.validate()?;
        Ok(donation)
    }

    /// Re-check invariants, e.g. after deserializing from a request body
    pub fn validate(&self) -> Result<()> {
        if self.food_name.trim().is_empty() {
            return Err(MatchEngineError::InvalidDonation(
                "food name must not be empty".to_string(),
            ));
        }
        if self.quantity == 0 {
            return Err(MatchEngineError::InvalidDonation(
                "quantity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_donor(mut self, donor_name: impl Into<String>) -> Self {
        self.donor_name = Some(donor_name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// e.g. "60 kg of Rice"
    pub fn display(&self) -> String {
        format!("{} {} of {}", self.quantity, self.unit, self.food_name)
    }
}
