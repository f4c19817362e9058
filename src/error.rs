//! Error types for the portfolio bot

use thiserror::Error;

/// Result type alias for bot operations
pub type Result<T> = std::result::Result<T, BotError>;

#[derive(Error, Debug)]
pub enum BotError {

    // =============================
    // Core Pipeline Errors
    // =============================

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Classifier error: {0}")]
    ClassifierError(String),

    #[error("Holdings service error: {0}")]
    HoldingsError(String),

    #[error("Risk analytics error: {0}")]
    RiskAnalyticsError(String),

    #[error("Session store error: {0}")]
    SessionStoreError(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
