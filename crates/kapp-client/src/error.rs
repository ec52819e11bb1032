//! Kapp client errors

use thiserror::Error;

/// Errors that can occur when talking to the Kapp API
#[derive(Debug, Error)]
pub enum KappError {
    /// HTTP request/response error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Kapp API returned an error
    #[error("Kapp API error: {0}")]
    Api(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Authentication failed (missing or rejected token)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// The discovered API resource catalog has no entry for this kind
    #[error("kind not found: {0}")]
    KindNotFound(String),

    /// Invalid request (e.g., empty kind or malformed base URL)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}
