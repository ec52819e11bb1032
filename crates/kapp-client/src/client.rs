//! Kapp API client
//!
//! Owns the authenticated HTTP wrapper and a lazily discovered API resource
//! catalog used to turn kinds into REST paths.

use crate::auth::CredentialsProvider;
use crate::common::HttpClient;
use crate::discovery::ApiResourceCatalog;
use crate::error::KappError;
use crate::resolver_trait::PathResolver;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Kapp API client
#[derive(Debug)]
pub struct KappClient {
    http: HttpClient,
    catalog: RwLock<Option<Arc<ApiResourceCatalog>>>,
}

impl KappClient {
    /// Create a new Kapp client
    ///
    /// # Arguments
    /// * `base_url` - Kapp API base URL (e.g., "http://kapp:3001")
    /// * `credentials` - Provider for the `Authorization` header
    pub fn new(
        base_url: String,
        credentials: impl CredentialsProvider + 'static,
    ) -> Result<Self, KappError> {
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(KappError::InvalidRequest(format!(
                "base URL must be http(s): {}",
                base_url
            )));
        }

        let http = HttpClient::new(HttpClient::default_client()?, base_url, Arc::new(credentials));
        Ok(Self::with_http(http))
    }

    /// Wrap an already configured HTTP client
    pub fn with_http(http: HttpClient) -> Self {
        Self {
            http,
            catalog: RwLock::new(None),
        }
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    /// Get the underlying HTTP wrapper
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Check connectivity and credentials against the core discovery endpoint.
    pub async fn validate_connection(&self) -> Result<(), KappError> {
        debug!("Validating Kapp API connectivity");
        let _: Value = self.http.get("/api/v1").await?;
        debug!("Kapp API reachable");
        Ok(())
    }

    /// Return the cached catalog, discovering it on first use
    pub async fn catalog(&self) -> Result<Arc<ApiResourceCatalog>, KappError> {
        if let Some(catalog) = self.catalog.read().await.as_ref() {
            return Ok(Arc::clone(catalog));
        }

        let mut guard = self.catalog.write().await;
        // Another task may have finished discovery while we waited
        if let Some(catalog) = guard.as_ref() {
            return Ok(Arc::clone(catalog));
        }

        let catalog = Arc::new(ApiResourceCatalog::discover(&self.http).await?);
        info!("Discovered {} API resource kinds", catalog.len());
        *guard = Some(Arc::clone(&catalog));
        Ok(catalog)
    }

    /// Discard the cached catalog and discover again
    pub async fn refresh_catalog(&self) -> Result<Arc<ApiResourceCatalog>, KappError> {
        self.catalog.write().await.take();
        self.catalog().await
    }
}

#[async_trait::async_trait]
impl PathResolver for KappClient {
    /// Resolve against the cached catalog; a kind missing from it triggers
    /// one rediscovery, so resources registered after startup are found.
    async fn resolve_path(&self, kind: &str, namespace: Option<&str>) -> Result<String, KappError> {
        match self.catalog().await?.resolve_path(kind, namespace) {
            Err(KappError::KindNotFound(_)) => {
                debug!("Kind {} not in cached catalog; rediscovering", kind);
                self.refresh_catalog().await?.resolve_path(kind, namespace)
            }
            result => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Anonymous, BearerToken};

    #[test]
    fn test_client_creation() {
        let client = KappClient::new("http://kapp:3001/".to_string(), BearerToken::new("t"))
            .expect("client should build");
        assert_eq!(client.base_url(), "http://kapp:3001");
    }

    #[test]
    fn test_client_rejects_non_http_base_url() {
        let err = KappClient::new("kapp:3001".to_string(), Anonymous).unwrap_err();
        assert!(matches!(err, KappError::InvalidRequest(_)));
    }
}
