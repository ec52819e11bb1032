//! Streaming resource watcher.
//!
//! Each [`StreamingResourceWatcher::watch`] call resolves the kind's path,
//! then spawns a task that owns one connection at a time:
//!
//! ```text
//! Connecting ──open ok──▶ Streaming ──error / end of body──▶ Retrying
//!     ▲                                                         │
//!     └──────────────────── retry_delay elapsed ◀───────────────┘
//!
//! any state ──stop() / handle dropped──▶ Closing ──▶ Closed
//! ```
//!
//! Every attempt starts by resetting the framer and UTF-8 decoder, so nothing
//! from a broken connection leaks into the next one. Reconnects do not
//! resume from a resource version; what the server replays on a new
//! connection is up to the server.

use crate::config::{DecodeErrorPolicy, WatchConfig};
use crate::error::WatchError;
use crate::event::{decode_event, WatchEventType};
use crate::framer::{ObjectFramer, Utf8Decoder};
use crate::transport::WatchTransport;
use futures::StreamExt;
use kapp_client::PathResolver;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Lifecycle of one watch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    /// Opening a connection
    Connecting,
    /// Connection open, events flowing
    Streaming,
    /// Waiting out the retry delay after a failure
    Retrying,
    /// Shutdown requested, tearing down
    Closing,
    /// Task finished; no more callbacks or reconnects
    Closed,
}

impl fmt::Display for WatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Starts auto-reconnecting watches against resource kinds
pub struct StreamingResourceWatcher {
    resolver: Arc<dyn PathResolver>,
    transport: Arc<dyn WatchTransport>,
    config: WatchConfig,
}

impl fmt::Debug for StreamingResourceWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamingResourceWatcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl StreamingResourceWatcher {
    /// Create a watcher
    pub fn new(
        resolver: Arc<dyn PathResolver>,
        transport: Arc<dyn WatchTransport>,
        config: WatchConfig,
    ) -> Self {
        Self {
            resolver,
            transport,
            config,
        }
    }

    /// Configuration applied to new watches
    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    /// Watch every resource of `kind`, calling `on_event` once per event in
    /// arrival order.
    ///
    /// Returns once the path is resolved and the watch task is spawned; a
    /// kind the server does not serve fails here and nothing is started.
    /// Transport failures after that point are never returned: the task logs
    /// them and reconnects after `retry_delay`, until the handle is stopped
    /// or dropped.
    pub async fn watch<T, F>(
        &self,
        kind: &str,
        namespace: Option<&str>,
        on_event: F,
    ) -> Result<WatchHandle, WatchError>
    where
        T: DeserializeOwned + Send + 'static,
        F: FnMut(WatchEventType, T) + Send + 'static,
    {
        if kind.trim().is_empty() {
            return Err(WatchError::InvalidKind(kind.to_string()));
        }

        let path = self.resolver.resolve_path(kind, namespace).await?;
        let url = watch_url(&path);
        info!("Starting {} watch on {}", kind, url);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (state_tx, state_rx) = watch::channel(WatchState::Connecting);

        let session = WatchSession {
            kind: kind.to_string(),
            url,
            transport: Arc::clone(&self.transport),
            config: self.config.clone(),
            state: state_tx,
        };
        let task = tokio::spawn(session.run(shutdown_rx, on_event));

        Ok(WatchHandle {
            kind: kind.to_string(),
            shutdown: shutdown_tx,
            state: state_rx,
            task: Some(task),
        })
    }
}

/// Append `watch=true` to a collection path
fn watch_url(path: &str) -> String {
    if path.contains('?') {
        format!("{}&watch=true", path)
    } else {
        format!("{}?watch=true", path)
    }
}

/// Disposer for a running watch.
///
/// Dropping the handle requests shutdown as well; `stop` additionally waits
/// for the task to finish.
#[derive(Debug)]
pub struct WatchHandle {
    kind: String,
    shutdown: watch::Sender<bool>,
    state: watch::Receiver<WatchState>,
    task: Option<JoinHandle<()>>,
}

impl WatchHandle {
    /// Kind being watched
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Current lifecycle state
    pub fn state(&self) -> WatchState {
        *self.state.borrow()
    }

    /// Whether the watch task has finished
    pub fn is_closed(&self) -> bool {
        self.state() == WatchState::Closed
    }

    /// Stop the watch and wait for its task to exit.
    ///
    /// In-flight I/O is abandoned; once this returns no further callbacks
    /// run and no reconnect is scheduled.
    pub async fn stop(&mut self) {
        self.shutdown.send_replace(true);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!("{} watch task failed: {}", self.kind, e);
            }
        }
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.shutdown.send_replace(true);
    }
}

/// State owned by the spawned watch task
struct WatchSession {
    kind: String,
    url: String,
    transport: Arc<dyn WatchTransport>,
    config: WatchConfig,
    state: watch::Sender<WatchState>,
}

impl WatchSession {
    fn set_state(&self, state: WatchState) {
        let previous = self.state.send_replace(state);
        if previous != state {
            debug!("{} watch: {} -> {}", self.kind, previous, state);
        }
    }

    async fn run<T, F>(self, mut shutdown: watch::Receiver<bool>, mut on_event: F)
    where
        T: DeserializeOwned,
        F: FnMut(WatchEventType, T),
    {
        let mut attempt: u64 = 0;
        let mut framer = self.config.new_framer();
        let mut utf8 = Utf8Decoder::new();

        while !*shutdown.borrow_and_update() {
            attempt += 1;
            self.set_state(WatchState::Connecting);

            let outcome = tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                outcome = self.stream_once(framer.as_mut(), &mut utf8, &mut on_event) => outcome,
            };

            match outcome {
                Ok(()) => warn!(
                    "{} watch closed by server (attempt {}); reconnecting in {:?}",
                    self.kind, attempt, self.config.retry_delay
                ),
                Err(e) => warn!(
                    "{} watch failed (attempt {}): {}; reconnecting in {:?}",
                    self.kind, attempt, e, self.config.retry_delay
                ),
            }

            self.set_state(WatchState::Retrying);
            tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                () = tokio::time::sleep(self.config.retry_delay) => {}
            }
        }

        self.set_state(WatchState::Closing);
        info!("{} watch stopped", self.kind);
        self.set_state(WatchState::Closed);
    }

    /// Run one connection attempt until it fails or the server ends it.
    ///
    /// Framer and decoder are reset first so nothing buffered by a broken
    /// connection survives into this one.
    async fn stream_once<T, F>(
        &self,
        framer: &mut dyn ObjectFramer,
        utf8: &mut Utf8Decoder,
        on_event: &mut F,
    ) -> Result<(), WatchError>
    where
        T: DeserializeOwned,
        F: FnMut(WatchEventType, T),
    {
        framer.reset();
        utf8.reset();

        let mut body = self.transport.open(&self.url).await?;
        self.set_state(WatchState::Streaming);

        while let Some(chunk) = body.next().await {
            let text = utf8.decode(&chunk?);
            for candidate in framer.push(&text)? {
                match decode_event::<T>(&candidate) {
                    Ok(event) => on_event(event.event_type, event.object),
                    Err(e) => match self.config.decode_error_policy {
                        DecodeErrorPolicy::Skip => {
                            warn!("{} watch: skipping undecodable event: {}", self.kind, e);
                        }
                        DecodeErrorPolicy::Reconnect => return Err(e),
                    },
                }
            }
        }

        Ok(())
    }
}
