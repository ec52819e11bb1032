//! Test utilities for exercising the watch loop without sockets

use crate::error::WatchError;
use crate::transport::{ByteStream, WatchTransport};
use bytes::Bytes;
use futures::{stream, StreamExt};
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::time::Instant;

/// What one connection attempt does
pub enum Attempt {
    /// `open` itself fails
    Refuse(String),
    /// Body yields these chunks; `Err` items are mid-stream transport errors
    Body {
        chunks: Vec<Result<String, String>>,
        /// Keep the connection open after the last chunk instead of ending it
        hang: bool,
    },
}

impl Attempt {
    /// Chunks followed by an open, silent connection
    pub fn chunks(chunks: &[&str]) -> Self {
        Self::Body {
            chunks: chunks.iter().map(|c| Ok((*c).to_string())).collect(),
            hang: true,
        }
    }

    /// Chunks followed by a transport error
    pub fn chunks_then_fail(chunks: &[&str], error: &str) -> Self {
        let mut items: Vec<Result<String, String>> =
            chunks.iter().map(|c| Ok((*c).to_string())).collect();
        items.push(Err(error.to_string()));
        Self::Body { chunks: items, hang: false }
    }

    /// Chunks followed by a clean end of body
    pub fn chunks_then_close(chunks: &[&str]) -> Self {
        Self::Body {
            chunks: chunks.iter().map(|c| Ok((*c).to_string())).collect(),
            hang: false,
        }
    }
}

/// Transport replaying scripted attempts in order.
///
/// Once the script runs out every further connection stays open and
/// silent, so a misbehaving test stalls instead of spinning.
pub struct ScriptedTransport {
    attempts: Mutex<VecDeque<Attempt>>,
    opened: Mutex<Vec<(String, Instant)>>,
}

impl ScriptedTransport {
    pub fn new(attempts: Vec<Attempt>) -> Self {
        Self {
            attempts: Mutex::new(attempts.into()),
            opened: Mutex::new(Vec::new()),
        }
    }

    /// URLs opened so far, with the (paused-clock aware) time of each
    pub fn opened(&self) -> Vec<(String, Instant)> {
        self.opened.lock().unwrap().clone()
    }

    pub fn open_count(&self) -> usize {
        self.opened.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl WatchTransport for ScriptedTransport {
    async fn open(&self, url: &str) -> Result<ByteStream, WatchError> {
        self.opened.lock().unwrap().push((url.to_string(), Instant::now()));

        let next = self.attempts.lock().unwrap().pop_front();
        match next {
            Some(Attempt::Refuse(error)) => Err(WatchError::Transport(error)),
            Some(Attempt::Body { chunks, hang }) => {
                let body = stream::iter(chunks.into_iter().map(|c| {
                    c.map(Bytes::from).map_err(WatchError::Transport)
                }));
                if hang {
                    Ok(body.chain(stream::pending()).boxed())
                } else {
                    Ok(body.boxed())
                }
            }
            None => Ok(stream::pending().boxed()),
        }
    }
}

/// Let spawned tasks run without letting the paused clock move
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}
