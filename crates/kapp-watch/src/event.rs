//! Watch event envelope
//!
//! Every object on a watch stream has the shape
//! `{"type": "ADDED" | "MODIFIED" | ..., "object": <resource>}`.

use crate::error::WatchError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of change reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WatchEventType {
    /// Resource created (or listed on connect)
    Added,
    /// Resource updated
    Modified,
    /// Resource removed
    Deleted,
    /// Progress marker carrying only a resource version
    Bookmark,
    /// Server-side watch error; `object` is a `Status`
    Error,
}

impl fmt::Display for WatchEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Added => "ADDED",
            Self::Modified => "MODIFIED",
            Self::Deleted => "DELETED",
            Self::Bookmark => "BOOKMARK",
            Self::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// One decoded watch event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchEvent<T> {
    /// What happened
    #[serde(rename = "type")]
    pub event_type: WatchEventType,
    /// The resource body; its shape is up to the caller
    pub object: T,
}

/// Decode one boundary candidate into an event envelope
pub fn decode_event<T: DeserializeOwned>(candidate: &str) -> Result<WatchEvent<T>, WatchError> {
    serde_json::from_str(candidate).map_err(|e| WatchError::decode(e, candidate))
}
