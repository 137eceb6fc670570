use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::scoring::is_valid_radius;

/// Per-request matching options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchOptions {
    /// Search radius around the donor
    pub max_distance_km: f64,
    /// Use the proximity ranker when a donor location is known
    pub proximity_enabled: bool,
    /// Try the AI ranker before the rule-based fallback
    pub ai_enabled: bool,
    /// Only consider NGOs whose capacity covers the whole donation
    pub require_full_capacity: bool,
    /// Proximity ranking only considers NGOs that can hold the whole donation
    pub proximity_full_capacity: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            max_distance_km: 25.0,
            proximity_enabled: true,
            ai_enabled: true,
            require_full_capacity: false,
            proximity_full_capacity: true,
        }
    }
}

/// OpenAI-compatible chat completions endpoint used by the AI ranker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    pub base_url: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_ms: u64,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            timeout_ms: 5000,
        }
    }
}

impl AiSettings {
    /// Read `OPENAI_BASE_URL`, `OPENAI_API_KEY`, `OPENAI_MODEL`, `MATCH_AI_TIMEOUT_MS`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            model: std::env::var("OPENAI_MODEL").unwrap_or(defaults.model),
            timeout_ms: env_parse("MATCH_AI_TIMEOUT_MS", defaults.timeout_ms),
        }
    }
}

/// Process-level configuration for the binaries and bindings
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub db_path: String,
    pub port: u16,
    pub options: MatchOptions,
    pub ai: AiSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            db_path: "foodbridge.db".to_string(),
            port: 8090,
            options: MatchOptions::default(),
            ai: AiSettings::default(),
        }
    }
}

impl EngineConfig {
    /// Load from the environment, keeping defaults for unset or unparsable values
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let options = MatchOptions {
            max_distance_km: env_parse_where(
                "MAX_DISTANCE_KM",
                defaults.options.max_distance_km,
                is_valid_radius,
            ),
            ai_enabled: env_parse("MATCH_AI_ENABLED", defaults.options.ai_enabled),
            proximity_enabled: env_parse(
                "MATCH_PROXIMITY_ENABLED",
                defaults.options.proximity_enabled,
            ),
            require_full_capacity: env_parse(
                "MATCH_REQUIRE_FULL_CAPACITY",
                defaults.options.require_full_capacity,
            ),
            proximity_full_capacity: env_parse(
                "MATCH_PROXIMITY_FULL_CAPACITY",
                defaults.options.proximity_full_capacity,
            ),
        };

        Self {
            db_path: std::env::var("DB_PATH").unwrap_or(defaults.db_path),
            port: env_parse("PORT", defaults.port),
            options,
            ai: AiSettings::from_env(),
        }
    }
}

fn env_parse<T: FromStr + Copy>(key: &str, default: T) -> T {
    env_parse_where(key, default, |_| true)
}

fn env_parse_where<T: FromStr + Copy>(key: &str, default: T, accept: impl Fn(T) -> bool) -> T {
    match std::env::var(key) {
        Ok(raw) => parse_or(key, &raw, default, accept),
        Err(_) => default,
    }
}

fn parse_or<T: FromStr + Copy>(key: &str, raw: &str, default: T, accept: impl Fn(T) -> bool) -> T {
    match raw.trim().parse::<T>() {
        Ok(value) if accept(value) => value,
        _ => {
            tracing::warn!("⚠️ Ignoring invalid {}={:?}, using default", key, raw);
            default
        }
    }
}
