//! Artifact Store Module
//!
//! Durable container/key blob storage for model binary artifacts:
//! - In-memory backend for tests and ephemeral pipelines
//! - Filesystem backend with `file://` URIs
//! - Transparent LZ4/ZSTD compression wrapper (`compression` feature)
//!
//! Containers play the role of buckets. Writing into a container that was
//! never ensured is an error, so callers go through
//! [`ArtifactStore::ensure_container`] first.
//!
//! # Example
//!
//! ```rust
//! use mlops_deploy::artifact::{ArtifactStore, MemoryArtifactStore};
//!
//! # async fn example() -> mlops_deploy::Result<()> {
//! let store = MemoryArtifactStore::new();
//!
//! store.ensure_container("model-repository").await?;
//! store.put("model-repository", "run-1.zip", b"weights".to_vec()).await?;
//! let bytes = store.get("model-repository", "run-1.zip").await?;
//! assert_eq!(bytes, Some(b"weights".to_vec()));
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "compression")]
mod compressed;
mod fs;
mod memory;

#[cfg(feature = "compression")]
pub use compressed::{CompressedArtifactStore, Compression};
pub use fs::FsArtifactStore;
pub use memory::MemoryArtifactStore;

use crate::{Error, Result};
use std::future::Future;

/// Blob storage for model artifacts, organised in containers.
pub trait ArtifactStore: Send + Sync {
    /// Create the container if it does not exist yet.
    ///
    /// No-op if it already exists.
    fn ensure_container(&self, container: &str) -> impl Future<Output = Result<()>> + Send;

    /// Check whether a container exists.
    fn container_exists(&self, container: &str) -> impl Future<Output = Result<bool>> + Send;

    /// Store `bytes` under `key`, overwriting any existing artifact.
    ///
    /// Fails with `Error::ArtifactTransfer` if the container does not exist.
    fn put(
        &self,
        container: &str,
        key: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Fetch an artifact. Returns `None` if it doesn't exist.
    fn get(
        &self,
        container: &str,
        key: &str,
    ) -> impl Future<Output = Result<Option<Vec<u8>>>> + Send;

    /// Check whether an artifact exists.
    fn exists(&self, container: &str, key: &str) -> impl Future<Output = Result<bool>> + Send;

    /// Delete an artifact. No-op if it doesn't exist.
    fn delete(&self, container: &str, key: &str) -> impl Future<Output = Result<()>> + Send;

    /// Address under which the artifact is (or would be) reachable.
    fn uri(&self, container: &str, key: &str) -> String;

    /// Copy an artifact between locations.
    ///
    /// Fails with `Error::NotFound` if the source is missing.
    fn copy(
        &self,
        src_container: &str,
        src_key: &str,
        dst_container: &str,
        dst_key: &str,
    ) -> impl Future<Output = Result<()>> + Send {
        async move {
            let bytes = self
                .get(src_container, src_key)
                .await?
                .ok_or_else(|| Error::not_found("artifact", format!("{src_container}/{src_key}")))?;
            self.put(dst_container, dst_key, bytes).await
        }
    }
}
