//! In-memory artifact store implementation using `DashMap`.
//!
//! Data is lost on process restart. Use `FsArtifactStore` for durability.

use super::ArtifactStore;
use crate::{Error, Result};
use dashmap::{DashMap, DashSet};

/// In-memory artifact store using lock-free concurrent maps.
///
/// Artifacts are keyed by `container/key`. URIs use the `memory://` scheme.
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    containers: DashSet<String>,
    objects: DashMap<String, Vec<u8>>,
}

fn object_key(container: &str, key: &str) -> String {
    format!("{container}/{key}")
}

impl MemoryArtifactStore {
    /// Create a new, empty in-memory artifact store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored artifacts across all containers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if no artifacts are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl ArtifactStore for MemoryArtifactStore {
    async fn ensure_container(&self, container: &str) -> Result<()> {
        if self.containers.insert(container.to_string()) {
            tracing::debug!(container, "created artifact container");
        }
        Ok(())
    }

    async fn container_exists(&self, container: &str) -> Result<bool> {
        Ok(self.containers.contains(container))
    }

    async fn put(&self, container: &str, key: &str, bytes: Vec<u8>) -> Result<()> {
        if !self.containers.contains(container) {
            return Err(Error::ArtifactTransfer(format!(
                "container '{container}' does not exist"
            )));
        }
        self.objects.insert(object_key(container, key), bytes);
        Ok(())
    }

    async fn get(&self, container: &str, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self
            .objects
            .get(&object_key(container, key))
            .map(|v| v.value().clone()))
    }

    async fn exists(&self, container: &str, key: &str) -> Result<bool> {
        Ok(self.objects.contains_key(&object_key(container, key)))
    }

    async fn delete(&self, container: &str, key: &str) -> Result<()> {
        self.objects.remove(&object_key(container, key));
        Ok(())
    }

    fn uri(&self, container: &str, key: &str) -> String {
        format!("memory://{container}/{key}")
    }
}
