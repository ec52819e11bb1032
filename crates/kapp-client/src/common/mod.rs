//! Common utilities for the Kapp API client
//!
//! Provides the authenticated HTTP wrapper shared by discovery and watch
//! connections.

use crate::auth::CredentialsProvider;
use crate::error::KappError;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Timeout applied to ordinary request/response calls.
///
/// Watch connections never complete, so `open_stream` does not use it.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for establishing a TCP/TLS connection.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client wrapper with authentication
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    credentials: Arc<dyn CredentialsProvider>,
}

impl HttpClient {
    /// Create a new HTTP client wrapper
    pub fn new(client: Client, base_url: String, credentials: Arc<dyn CredentialsProvider>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    /// Build the underlying reqwest client with the default timeouts
    pub fn default_client() -> Result<Client, KappError> {
        Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(KappError::Http)
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a full URL from a path
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.credentials.authorization() {
            Some(value) => request.header("Authorization", value),
            None => request,
        }
    }

    /// Make a GET request and decode the JSON body
    pub async fn get<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, KappError> {
        let url = self.build_url(path);
        debug!("GET {}", url);

        let response = self
            .authorized(self.client.get(&url))
            .header("Accept", "application/json")
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(KappError::Http)?;

        let response = check_status(response, "GET", path).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            debug!(
                "Undecodable response from {} (first 500 chars): {}",
                path,
                body.chars().take(500).collect::<String>()
            );
            KappError::Serialization(e)
        })
    }

    /// Open a long-lived GET whose body is consumed incrementally.
    ///
    /// Only the connect timeout applies; the caller owns the returned
    /// response and reads it with `bytes_stream()`.
    pub async fn open_stream(&self, url: &str) -> Result<Response, KappError> {
        let url = self.build_url(url);
        debug!("GET {} (streaming)", url);

        let response = self
            .authorized(self.client.get(&url))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(KappError::Http)?;

        check_status(response, "GET", &url).await
    }
}

/// Map non-success statuses onto `KappError` variants
pub(crate) async fn check_status(
    response: Response,
    method: &str,
    path: &str,
) -> Result<Response, KappError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(match status {
        StatusCode::NOT_FOUND => KappError::NotFound(format!("{} - {}", path, body)),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            KappError::Authentication(format!("{} {}: {} - {}", method, path, status, body))
        }
        _ => KappError::Api(format!("{} {} failed: {} - {}", method, path, status, body)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Anonymous;

    fn http(base: &str) -> HttpClient {
        HttpClient::new(Client::new(), base.to_string(), Arc::new(Anonymous))
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        assert_eq!(http("http://kapp:3001/").base_url(), "http://kapp:3001");
    }

    #[test]
    fn test_build_url_relative_and_absolute() {
        let client = http("http://kapp:3001");
        assert_eq!(client.build_url("/api/v1/nodes"), "http://kapp:3001/api/v1/nodes");
        assert_eq!(client.build_url("api/v1/nodes"), "http://kapp:3001/api/v1/nodes");
        assert_eq!(
            client.build_url("https://other:443/api/v1/pods"),
            "https://other:443/api/v1/pods"
        );
    }
}
