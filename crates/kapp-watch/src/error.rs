//! Watch errors

use kapp_client::KappError;
use thiserror::Error;

/// Errors that can occur while starting or running a watch
#[derive(Debug, Error)]
pub enum WatchError {
    /// Path resolution or request setup failed
    #[error("Kapp client error: {0}")]
    Client(#[from] KappError),

    /// Empty or otherwise unusable resource kind
    #[error("Invalid resource kind: {0:?}")]
    InvalidKind(String),

    /// Connection-level failure; always recovered by reconnecting
    #[error("Transport error: {0}")]
    Transport(String),

    /// A boundary candidate was not a valid event envelope
    #[error("Failed to decode watch event: {source} - candidate (first 200 chars): {candidate}")]
    Decode {
        /// Underlying JSON error
        source: serde_json::Error,
        /// Truncated offending text
        candidate: String,
    },

    /// A single object grew past the configured limit
    #[error("Watch object exceeds {limit} bytes (buffered {size})")]
    ObjectTooLarge {
        /// Bytes buffered so far
        size: usize,
        /// Configured maximum
        limit: usize,
    },
}

impl WatchError {
    /// Build a decode error, keeping only a prefix of the candidate text
    pub fn decode(source: serde_json::Error, candidate: &str) -> Self {
        Self::Decode {
            source,
            candidate: candidate.chars().take(200).collect(),
        }
    }
}
