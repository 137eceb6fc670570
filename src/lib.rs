//! # FoodBridge Match Engine
//!
//! Donation-to-NGO matching engine with:
//! - Capacity and haversine proximity scoring
//! - Combined proximity/capacity ranking inside a search radius
//! - AI-assisted ranking with a deterministic rule-based fallback
//! - SQLite or in-memory NGO directories
//! - Multiple interfaces: Rust library, Python bindings, HTTP API, CLI
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chrono::NaiveDate;
//! use foodbridge_match_engine::{
//!     Donation, MatchEngine, MatchOptions, QualityLabel, SqliteDirectory, Unit,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let directory = Arc::new(SqliteDirectory::new("foodbridge.db").await?);
//!     let engine = MatchEngine::new(directory, MatchOptions::default());
//!
//!     let expiry = NaiveDate::from_ymd_opt(2024, 6, 20).unwrap();
//!     let donation = Donation::new("Rice", 60, Unit::Kg, QualityLabel::Fresh, expiry)?;
//!     let donor = foodbridge_match_engine::scoring::locate("Mumbai");
//!
//!     let result = engine.match_donation(&engine.request(donation, donor)).await;
//!     println!("{}", result.display());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod directory;
pub mod engine;
pub mod error;
pub mod notifications;
pub mod quality;
pub mod ranking;
pub mod scoring;

// Re-export primary types
pub use config::{AiSettings, EngineConfig, MatchOptions};
pub use core::{Donation, GeoLocation, MatchMethod, MatchResult, NgoCandidate, QualityLabel, ScoredCandidate, Unit};
pub use directory::{CandidateProvider, InMemoryDirectory, NewNgo, SqliteDirectory};
pub use engine::MatchEngine;
pub use error::{MatchEngineError, Result};
pub use notifications::{plan_notifications, NgoNotification, Priority};
pub use ranking::{MatchRequest, Ranker};

// Python bindings
#[cfg(feature = "python")]
pub mod python;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
