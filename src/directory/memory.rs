use async_trait::async_trait;
use std::sync::RwLock;

use crate::core::NgoCandidate;
use crate::directory::{sort_candidates, CandidateProvider};
use crate::error::{MatchEngineError, Result};

/// Candidate set held in memory, for tests, benchmarks and embedding
pub struct InMemoryDirectory {
    ngos: RwLock<Vec<(NgoCandidate, bool)>>,
}

impl InMemoryDirectory {
    pub fn new(candidates: Vec<NgoCandidate>) -> Self {
        Self {
            ngos: RwLock::new(candidates.into_iter().map(|c| (c, true)).collect()),
        }
    }

    pub fn upsert(&self, candidate: NgoCandidate) -> Result<()> {
        let mut ngos = self.ngos.write().map_err(|_| lock_error())?;
        match ngos.iter_mut().find(|(ngo, _)| ngo.id == candidate.id) {
            Some(entry) => entry.0 = candidate,
            None => ngos.push((candidate, true)),
        }
        Ok(())
    }

    pub fn deactivate(&self, id: i64) -> Result<()> {
        let mut ngos = self.ngos.write().map_err(|_| lock_error())?;
        let entry = ngos
            .iter_mut()
            .find(|(ngo, _)| ngo.id == id)
            .ok_or(MatchEngineError::NotFound(id))?;
        entry.1 = false;
        Ok(())
    }
}

impl Default for InMemoryDirectory {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

fn lock_error() -> MatchEngineError {
    MatchEngineError::Directory("in-memory directory lock poisoned".to_string())
}

#[async_trait]
impl CandidateProvider for InMemoryDirectory {
    async fn get_candidates(&self, min_capacity: u32) -> Result<Vec<NgoCandidate>> {
        let ngos = self.ngos.read().map_err(|_| lock_error())?;
        let mut candidates: Vec<NgoCandidate> = ngos
            .iter()
            .filter(|(ngo, active)| *active && ngo.capacity >= min_capacity)
            .map(|(ngo, _)| ngo.clone())
            .collect();
        sort_candidates(&mut candidates);
        Ok(candidates)
    }

    fn name(&self) -> &str {
        "memory"
    }
}
