use thiserror::Error;

/// Main error type for the match engine
#[derive(Error, Debug)]
pub enum MatchEngineError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// HTTP request errors
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// AI ranking endpoint errors
    #[error("AI API error: {0}")]
    AiApi(String),

    /// AI answered, but the answer cannot be used
    #[error("Invalid AI response: {0}")]
    InvalidAiResponse(String),

    /// Donation rejected at the boundary
    #[error("Invalid donation: {0}")]
    InvalidDonation(String),

    /// Coordinates out of range
    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    /// Unknown NGO id
    #[error("NGO {0} not found")]
    NotFound(i64),

    /// Directory store errors
    #[error("Directory error: {0}")]
    Directory(String),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<String> for MatchEngineError {
    fn from(s: String) -> Self {
        MatchEngineError::Other(s)
    }
}

impl From<&str> for MatchEngineError {
    fn from(s: &str) -> Self {
        MatchEngineError::Other(s.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, MatchEngineError>;
