//! Error types for the NovaMind pipeline

use thiserror::Error;

/// Main error type for all NovaMind operations
#[derive(Error, Debug)]
pub enum NovaMindError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Language model error: {0}")]
    LanguageModel(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Processing error: {0}")]
    Processing(String),
}

impl From<config::ConfigError> for NovaMindError {
    fn from(err: config::ConfigError) -> Self {
        NovaMindError::Config(err.to_string())
    }
}

/// Result type for NovaMind operations
pub type Result<T> = std::result::Result<T, NovaMindError>;
