//! Capacity fit between an NGO and a donation.

/// Score for an NGO that cannot hold the whole donation
pub const UNDER_CAPACITY_SCORE: f64 = 0.3;
/// Capacity within 2x the quantity
pub const TIGHT_FIT_SCORE: f64 = 1.0;
/// Capacity within 5x the quantity
pub const OVERSIZED_FIT_SCORE: f64 = 0.8;
/// Anything larger
pub const SURPLUS_SCORE: f64 = 0.6;

/// Score how well `capacity` fits `quantity` on a 0.0 - 1.0 scale.
///
/// Capacity close to the donation size scores best; large surpluses are
/// deprioritized so big NGOs stay free for big donations. `quantity` is
/// expected to be positive (enforced by [`Donation`](crate::core::Donation)).
pub fn capacity_score(capacity: u32, quantity: u32) -> f64 {
    let capacity = u64::from(capacity);
    let quantity = u64::from(quantity);

    if capacity < quantity {
        UNDER_CAPACITY_SCORE
    } else if capacity <= quantity * 2 {
        TIGHT_FIT_SCORE
    } else if capacity <= quantity * 5 {
        OVERSIZED_FIT_SCORE
    } else {
        SURPLUS_SCORE
    }
}

/// Coarse capacity bucket used in reasoning text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityTier {
    Excellent,
    Good,
    Limited,
}

impl CapacityTier {
    pub fn of(capacity: u32, quantity: u32) -> Self {
        let capacity = u64::from(capacity);
        let quantity = u64::from(quantity);

        if capacity >= quantity * 2 {
            CapacityTier::Excellent
        } else if capacity >= quantity {
            CapacityTier::Good
        } else {
            CapacityTier::Limited
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CapacityTier::Excellent => "Excellent",
            CapacityTier::Good => "Good",
            CapacityTier::Limited => "Limited",
        }
    }

    /// Per-candidate reason line, `None` when capacity is below need
    pub fn reason(&self, capacity: u32) -> Option<String> {
        match self {
            CapacityTier::Excellent => Some(format!("High capacity ({} units)", capacity)),
            CapacityTier::Good => Some(format!("Adequate capacity ({} units)", capacity)),
            CapacityTier::Limited => None,
        }
    }
}
