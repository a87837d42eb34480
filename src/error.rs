//! Error types for PEARL fatigue scoring

use thiserror::Error;

/// Errors that can occur outside the (infallible) scoring path
#[derive(Debug, Error)]
pub enum FatigueError {
    #[error("Unknown factor key: {0}")]
    UnknownFactor(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse input: {0}")]
    ParseError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
