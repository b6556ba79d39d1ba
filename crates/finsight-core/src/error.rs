//! Error types for Finsight

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("AI provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Failure classification at the AI provider boundary.
///
/// The provider implementation decides the variant from the transport-level
/// response (HTTP status, API error payload). Callers never inspect error
/// message text to decide retry behavior.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Quota exhausted or per-minute limit hit. Retryable with backoff.
    #[error("rate limited")]
    RateLimited,

    /// API key rejected or lacking permissions. Not retryable.
    #[error("access forbidden")]
    Forbidden,

    /// Requested model does not exist or is unavailable. Not retryable.
    #[error("model not found")]
    NotFound,

    /// Anything else the provider reported. Not retryable.
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
