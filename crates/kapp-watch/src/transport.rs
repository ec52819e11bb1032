//! Watch transport
//!
//! Abstracts "open a GET and give me its body as a stream of chunks" so the
//! reconnect loop can be tested without sockets.

use crate::error::WatchError;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use kapp_client::HttpClient;
use tracing::debug;

/// Response body of one watch connection
pub type ByteStream = BoxStream<'static, Result<Bytes, WatchError>>;

/// Opens watch connections
#[async_trait::async_trait]
pub trait WatchTransport: Send + Sync {
    /// Issue the GET and return its body stream.
    ///
    /// Connection failures and non-success statuses are `WatchError::Transport`.
    async fn open(&self, url: &str) -> Result<ByteStream, WatchError>;
}

/// Transport over the authenticated Kapp HTTP client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: HttpClient,
}

impl HttpTransport {
    /// Wrap an HTTP client
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait::async_trait]
impl WatchTransport for HttpTransport {
    async fn open(&self, url: &str) -> Result<ByteStream, WatchError> {
        let response = self
            .http
            .open_stream(url)
            .await
            .map_err(|e| WatchError::Transport(e.to_string()))?;

        debug!("Watch connection established: {}", response.url());

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| WatchError::Transport(e.to_string())))
            .boxed())
    }
}
