//! Watch configuration

use crate::decoder::DelimitedFramer;
use crate::framer::{JsonObjectFramer, ObjectFramer, DEFAULT_MAX_OBJECT_BYTES};
use std::str::FromStr;
use std::time::Duration;

/// Delay between a failed connection and the next attempt
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(3000);

/// How the response body is split into objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Framing {
    /// Brace-depth tokenizer; survives arbitrary chunk boundaries
    #[default]
    Tokenized,
    /// Legacy `}\n{` heuristic over the cumulative response text
    Delimited,
}

impl FromStr for Framing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tokenized" => Ok(Self::Tokenized),
            "delimited" => Ok(Self::Delimited),
            other => Err(format!("unknown framing {other:?}, expected tokenized or delimited")),
        }
    }
}

/// What to do with a candidate that does not decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeErrorPolicy {
    /// Log it, drop it, keep reading the same connection
    #[default]
    Skip,
    /// Log it and reconnect after the retry delay
    Reconnect,
}

impl FromStr for DecodeErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "reconnect" => Ok(Self::Reconnect),
            other => Err(format!("unknown decode error policy {other:?}, expected skip or reconnect")),
        }
    }
}

/// Settings shared by every watch started from one watcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    /// Fixed wait before reconnecting; there is no backoff growth
    pub retry_delay: Duration,
    /// Object splitting strategy
    pub framing: Framing,
    /// Handling of undecodable candidates
    pub decode_error_policy: DecodeErrorPolicy,
    /// Largest single object the tokenizer will buffer
    pub max_object_bytes: usize,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            retry_delay: DEFAULT_RETRY_DELAY,
            framing: Framing::default(),
            decode_error_policy: DecodeErrorPolicy::default(),
            max_object_bytes: DEFAULT_MAX_OBJECT_BYTES,
        }
    }
}

impl WatchConfig {
    /// Override the reconnect delay
    #[must_use]
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Override the framing strategy
    #[must_use]
    pub fn with_framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }

    /// Override the decode error policy
    #[must_use]
    pub fn with_decode_error_policy(mut self, policy: DecodeErrorPolicy) -> Self {
        self.decode_error_policy = policy;
        self
    }

    /// Override the object size cap
    #[must_use]
    pub fn with_max_object_bytes(mut self, max_object_bytes: usize) -> Self {
        self.max_object_bytes = max_object_bytes;
        self
    }

    /// Fresh framer for one connection attempt
    pub fn new_framer(&self) -> Box<dyn ObjectFramer> {
        match self.framing {
            Framing::Tokenized => Box::new(JsonObjectFramer::new(self.max_object_bytes)),
            Framing::Delimited => Box::new(DelimitedFramer::new()),
        }
    }
}
