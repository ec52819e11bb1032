//! PathResolver trait for mocking
//!
//! Watch connections only need "which path serves this kind", so the
//! resolver is abstracted to let tests run without a live discovery
//! endpoint.

use crate::error::KappError;

/// Resolves a resource kind to its REST collection path
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait PathResolver: Send + Sync {
    /// Return the collection path for `kind`, scoped to `namespace` when the
    /// kind is namespaced.
    ///
    /// Fails with `KappError::KindNotFound` if the kind is unknown.
    async fn resolve_path(&self, kind: &str, namespace: Option<&str>) -> Result<String, KappError>;
}
