//! Kapp API Client
//!
//! Thin client for the Kapp API, which fronts Kubernetes-style resources.
//! Provides authenticated HTTP access, API resource discovery and the
//! kind-to-path resolution that watch connections are built on.
//!
//! # Example
//!
//! ```no_run
//! use kapp_client::{BearerToken, KappClient, PathResolver};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = KappClient::new(
//!     "http://localhost:3001".to_string(),
//!     BearerToken::new("your-api-token"),
//! )?;
//!
//! // Kind lookups go through the discovered API resource catalog
//! let path = client.resolve_path("Pod", Some("default")).await?;
//! assert_eq!(path, "/api/v1/namespaces/default/pods");
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod common;
pub mod discovery;
pub mod error;
#[path = "trait.rs"]
pub mod resolver_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use auth::{Anonymous, BearerToken, CredentialsProvider};
pub use client::KappClient;
pub use common::HttpClient;
pub use discovery::{ApiResourceCatalog, ApiResourceEntry};
pub use error::KappError;
pub use resolver_trait::PathResolver;
#[cfg(feature = "test-util")]
pub use mock::StaticPathResolver;
