pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{GeoLocation, NgoCandidate};
use crate::error::Result;

pub use memory::InMemoryDirectory;
pub use sqlite::SqliteDirectory;

/// Source of NGOs eligible for matching
#[async_trait]
pub trait CandidateProvider: Send + Sync {
    /// Active NGOs with `capacity >= min_capacity`, highest capacity first.
    ///
    /// No qualifying NGO is an empty vector, not an error.
    async fn get_candidates(&self, min_capacity: u32) -> Result<Vec<NgoCandidate>>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}

/// Registration payload for a new NGO
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewNgo {
    pub name: String,

    #[serde(default)]
    pub organization: String,

    #[serde(default)]
    pub email: Option<String>,

    pub capacity: u32,

    #[serde(default)]
    pub specialization: Option<String>,

    #[serde(default)]
    pub location: Option<GeoLocation>,
}

impl NewNgo {
    pub fn new(name: impl Into<String>, capacity: u32) -> Self {
        Self {
            name: name.into(),
            organization: String::new(),
            email: None,
            capacity,
            specialization: None,
            location: None,
        }
    }

    pub fn with_location(mut self, location: GeoLocation) -> Self {
        self.location = Some(location);
        self
    }
}

/// Order shared by every provider: capacity desc, then id asc
pub(crate) fn sort_candidates(candidates: &mut [NgoCandidate]) {
    candidates.sort_by(|a, b| b.capacity.cmp(&a.capacity).then(a.id.cmp(&b.id)));
}
