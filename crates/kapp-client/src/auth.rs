//! Request credentials
//!
//! Credentials are handed to the client explicitly instead of being read
//! from ambient state, so tests can swap in a fake provider.

use std::fmt;

/// Supplies the `Authorization` header for outgoing requests.
pub trait CredentialsProvider: Send + Sync + fmt::Debug {
    /// Full header value, or `None` to send the request unauthenticated.
    fn authorization(&self) -> Option<String>;
}

/// Static bearer token.
#[derive(Clone)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wrap a raw token
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

impl CredentialsProvider for BearerToken {
    fn authorization(&self) -> Option<String> {
        Some(format!("Bearer {}", self.0))
    }
}

/// No credentials at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl CredentialsProvider for Anonymous {
    fn authorization(&self) -> Option<String> {
        None
    }
}
