//! Static PathResolver for unit testing
//!
//! Serves a fixed kind → path map so watchers can be exercised without a
//! discovery endpoint.

use crate::error::KappError;
use crate::resolver_trait::PathResolver;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Resolver backed by an in-memory map
#[derive(Debug, Clone, Default)]
pub struct StaticPathResolver {
    paths: HashMap<String, String>,
    lookups: Arc<Mutex<Vec<(String, Option<String>)>>>,
}

impl StaticPathResolver {
    /// Create an empty resolver; every lookup fails with `KindNotFound`
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the path served for `kind`
    pub fn with_kind(mut self, kind: impl Into<String>, path: impl Into<String>) -> Self {
        self.paths.insert(kind.into(), path.into());
        self
    }

    /// Every `(kind, namespace)` lookup made so far
    pub fn lookups(&self) -> Vec<(String, Option<String>)> {
        self.lookups.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl PathResolver for StaticPathResolver {
    async fn resolve_path(&self, kind: &str, namespace: Option<&str>) -> Result<String, KappError> {
        if let Ok(mut lookups) = self.lookups.lock() {
            lookups.push((kind.to_string(), namespace.map(str::to_string)));
        }
        self.paths
            .get(kind)
            .cloned()
            .ok_or_else(|| KappError::KindNotFound(kind.to_string()))
    }
}
