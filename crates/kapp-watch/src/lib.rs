//! Kapp Resource Watch
//!
//! Long-lived `?watch=true` connections against Kapp resource endpoints.
//! The server never closes a watch response; it keeps appending one
//! `{"type": ..., "object": ...}` JSON object per change. This crate splits
//! that growing body back into objects, decodes them into typed
//! [`WatchEvent`]s and hands them to a callback in arrival order,
//! reconnecting after a fixed delay whenever the transport fails.
//!
//! # Example
//!
//! ```no_run
//! use kapp_client::{BearerToken, KappClient};
//! use kapp_watch::{HttpTransport, StreamingResourceWatcher, WatchConfig};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(KappClient::new(
//!     "http://localhost:3001".to_string(),
//!     BearerToken::new("your-api-token"),
//! )?);
//! let transport = Arc::new(HttpTransport::new(client.http().clone()));
//! let watcher = StreamingResourceWatcher::new(client, transport, WatchConfig::default());
//!
//! let mut handle = watcher
//!     .watch::<serde_json::Value, _>("Node", None, |event_type, node| {
//!         println!("{event_type}: {}", node["metadata"]["name"]);
//!     })
//!     .await?;
//!
//! // Later, when the view goes away
//! handle.stop().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod decoder;
pub mod error;
pub mod event;
pub mod framer;
pub mod transport;
pub mod watcher;
#[cfg(test)]
mod test_utils;

pub use config::{DecodeErrorPolicy, Framing, WatchConfig};
pub use decoder::{split_boundary_candidates, DelimitedFramer, ProgressDecoder};
pub use error::WatchError;
pub use event::{decode_event, WatchEvent, WatchEventType};
pub use framer::{JsonObjectFramer, ObjectFramer, Utf8Decoder};
pub use transport::{ByteStream, HttpTransport, WatchTransport};
pub use watcher::{StreamingResourceWatcher, WatchHandle, WatchState};
