//! API resource discovery
//!
//! Builds a kind → REST path catalog from the server's discovery documents
//! (`/api/v1`, `/apis` and each group's preferred version).

use crate::common::HttpClient;
use crate::error::KappError;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{APIGroupList, APIResourceList};
use std::collections::HashMap;
use tracing::{debug, warn};

/// One servable resource kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResourceEntry {
    /// Resource kind, e.g. `Pod`
    pub kind: String,
    /// Plural resource name used in paths, e.g. `pods`
    pub name: String,
    /// `v1` for the core group, `<group>/<version>` otherwise
    pub group_version: String,
    /// Whether the resource lives inside a namespace
    pub namespaced: bool,
}

impl ApiResourceEntry {
    /// Path prefix of the group/version this entry belongs to
    pub fn api_prefix(&self) -> String {
        if self.group_version.contains('/') {
            format!("/apis/{}", self.group_version)
        } else {
            format!("/api/{}", self.group_version)
        }
    }

    /// Collection path, scoped to `namespace` when the resource is namespaced
    pub fn collection_path(&self, namespace: Option<&str>) -> String {
        match namespace {
            Some(ns) if self.namespaced => format!(
                "{}/namespaces/{}/{}",
                self.api_prefix(),
                urlencoding::encode(ns),
                self.name
            ),
            _ => format!("{}/{}", self.api_prefix(), self.name),
        }
    }
}

/// Catalog of resource kinds discovered from the server
#[derive(Debug, Clone, Default)]
pub struct ApiResourceCatalog {
    entries: HashMap<String, ApiResourceEntry>,
}

impl ApiResourceCatalog {
    /// Build a catalog from discovery lists.
    ///
    /// Subresources (`pods/log`, ...) are skipped. When several groups serve
    /// the same kind, the first list wins, so callers pass the core group
    /// first.
    pub fn from_resource_lists(lists: &[APIResourceList]) -> Self {
        let mut entries = HashMap::new();
        for list in lists {
            for resource in &list.resources {
                if resource.name.contains('/') {
                    continue;
                }
                entries
                    .entry(resource.kind.clone())
                    .or_insert_with(|| ApiResourceEntry {
                        kind: resource.kind.clone(),
                        name: resource.name.clone(),
                        group_version: list.group_version.clone(),
                        namespaced: resource.namespaced,
                    });
            }
        }
        Self { entries }
    }

    /// Fetch every discovery document and build the catalog.
    ///
    /// A group whose resource list cannot be fetched is logged and skipped,
    /// since aggregated APIs are often temporarily unavailable.
    pub async fn discover(http: &HttpClient) -> Result<Self, KappError> {
        let mut lists: Vec<APIResourceList> = vec![http.get("/api/v1").await?];

        let groups: APIGroupList = http.get("/apis").await?;
        for group in &groups.groups {
            let Some(group_version) = group
                .preferred_version
                .as_ref()
                .or_else(|| group.versions.first())
                .map(|v| v.group_version.clone())
            else {
                continue;
            };

            match http.get::<APIResourceList>(&format!("/apis/{}", group_version)).await {
                Ok(list) => lists.push(list),
                Err(e) => warn!("Skipping API group {}: {}", group_version, e),
            }
        }

        let catalog = Self::from_resource_lists(&lists);
        debug!("Discovered {} resource kinds", catalog.len());
        Ok(catalog)
    }

    /// Look up a kind
    pub fn get(&self, kind: &str) -> Option<&ApiResourceEntry> {
        self.entries.get(kind)
    }

    /// Number of known kinds
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve the REST collection path serving `kind`
    pub fn resolve_path(&self, kind: &str, namespace: Option<&str>) -> Result<String, KappError> {
        self.get(kind)
            .map(|entry| entry.collection_path(namespace))
            .ok_or_else(|| KappError::KindNotFound(kind.to_string()))
    }
}
