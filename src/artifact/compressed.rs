//! Compressed artifact store wrapper
//!
//! Provides transparent LZ4/ZSTD compression for any `ArtifactStore` backend.
//!
//! Stored frame: `[codec tag: 1 byte][codec payload]`. Reads pick the codec
//! from the tag and stop once the output passes the configured size limit.

use std::io::Read;

use crate::artifact::ArtifactStore;
use crate::config::DeploymentConfig;
use crate::{Error, Result};

/// Compression algorithm for stored artifacts.
///
/// Every compressed artifact starts with a one-byte codec tag, so a store can
/// read artifacts written under a different algorithm than its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// LZ4, favouring speed (default)
    #[default]
    Lz4,
    /// ZSTD, favouring ratio
    Zstd,
}

const ZSTD_LEVEL: i32 = 3;

impl Compression {
    /// Algorithm name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Lz4 => "lz4",
            Self::Zstd => "zstd",
        }
    }

    const fn tag(self) -> u8 {
        match self {
            Self::Lz4 => b'L',
            Self::Zstd => b'Z',
        }
    }

    fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            b'L' => Ok(Self::Lz4),
            b'Z' => Ok(Self::Zstd),
            other => Err(Error::ArtifactTransfer(format!(
                "unknown artifact codec tag 0x{other:02x}"
            ))),
        }
    }

    /// Encode an artifact, prefixed with this algorithm's tag.
    ///
    /// An empty artifact encodes to an empty frame.
    ///
    /// # Errors
    /// Returns `Error::ArtifactTransfer` if the ZSTD encoder fails.
    pub fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        if data.is_empty() {
            return Ok(Vec::new());
        }
        let payload = match self {
            Self::Lz4 => lz4_flex::compress_prepend_size(data),
            Self::Zstd => zstd::bulk::compress(data, ZSTD_LEVEL)
                .map_err(|e| Error::ArtifactTransfer(format!("zstd encode: {e}")))?,
        };
        let mut frame = Vec::with_capacity(payload.len() + 1);
        frame.push(self.tag());
        frame.extend_from_slice(&payload);
        Ok(frame)
    }

    /// Decode a tagged frame, whichever algorithm wrote it.
    ///
    /// With `max_len` set, a frame that would inflate past it is rejected
    /// before the output is allocated.
    ///
    /// # Errors
    /// Returns `Error::ArtifactTransfer` for an unknown tag, corrupted data,
    /// or an artifact exceeding `max_len`.
    pub fn decompress(data: &[u8], max_len: Option<usize>) -> Result<Vec<u8>> {
        let Some((&tag, payload)) = data.split_first() else {
            return Ok(Vec::new());
        };
        match Self::from_tag(tag)? {
            Self::Lz4 => {
                let declared = lz4_declared_len(payload)?;
                check_limit(declared, max_len)?;
                lz4_flex::decompress_size_prepended(payload)
                    .map_err(|e| Error::ArtifactTransfer(format!("lz4 decode: {e}")))
            }
            Self::Zstd => {
                let decoder = zstd::stream::read::Decoder::new(payload)
                    .map_err(|e| Error::ArtifactTransfer(format!("zstd decode: {e}")))?;
                let cap = max_len
                    .and_then(|max| u64::try_from(max).ok())
                    .map_or(u64::MAX, |max| max.saturating_add(1));
                let mut out = Vec::new();
                decoder
                    .take(cap)
                    .read_to_end(&mut out)
                    .map_err(|e| Error::ArtifactTransfer(format!("zstd decode: {e}")))?;
                check_limit(out.len(), max_len)?;
                Ok(out)
            }
        }
    }
}

fn lz4_declared_len(payload: &[u8]) -> Result<usize> {
    let header: [u8; 4] = payload
        .get(..4)
        .and_then(|h| h.try_into().ok())
        .ok_or_else(|| Error::ArtifactTransfer("lz4 frame truncated".to_string()))?;
    usize::try_from(u32::from_le_bytes(header))
        .map_err(|e| Error::ArtifactTransfer(format!("lz4 frame size: {e}")))
}

fn check_limit(len: usize, max_len: Option<usize>) -> Result<()> {
    match max_len {
        Some(max) if len > max => Err(Error::ArtifactTransfer(format!(
            "artifact inflates to {len} bytes, limit is {max}"
        ))),
        _ => Ok(()),
    }
}

/// Compressed artifact store wrapper
///
/// Wraps any `ArtifactStore` and compresses on `put`, decompresses on `get`.
/// `copy` moves the stored frame as-is, so deploying an artifact never
/// inflates it in memory. Reads are bounded by an optional size limit,
/// usually the configured `max_artifact_bytes`.
///
/// # Example
///
/// ```rust,no_run
/// use mlops_deploy::artifact::{
///     ArtifactStore, CompressedArtifactStore, Compression, MemoryArtifactStore,
/// };
///
/// # async fn example() -> mlops_deploy::Result<()> {
/// let store = CompressedArtifactStore::new(MemoryArtifactStore::new(), Compression::Zstd)
///     .with_max_decompressed_bytes(64 * 1024 * 1024);
/// store.ensure_container("model-repository").await?;
/// store.put("model-repository", "run-1.zip", vec![0u8; 10000]).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CompressedArtifactStore<S: ArtifactStore> {
    inner: S,
    compression: Compression,
    max_decompressed_bytes: Option<usize>,
}

impl<S: ArtifactStore> CompressedArtifactStore<S> {
    /// Wrap `inner`, writing new artifacts with `compression`.
    #[must_use]
    pub const fn new(inner: S, compression: Compression) -> Self {
        Self {
            inner,
            compression,
            max_decompressed_bytes: None,
        }
    }

    /// Wrap `inner`, bounding reads by the configured artifact cap.
    #[must_use]
    pub const fn from_config(
        inner: S,
        compression: Compression,
        config: &DeploymentConfig,
    ) -> Self {
        Self {
            inner,
            compression,
            max_decompressed_bytes: config.max_artifact_bytes,
        }
    }

    /// Reject reads of artifacts that inflate past `max` bytes.
    #[must_use]
    pub const fn with_max_decompressed_bytes(mut self, max: usize) -> Self {
        self.max_decompressed_bytes = Some(max);
        self
    }

    /// Wrapped store, holding the compressed frames.
    #[must_use]
    pub const fn inner(&self) -> &S {
        &self.inner
    }

    /// Algorithm used for new writes.
    #[must_use]
    pub const fn compression(&self) -> Compression {
        self.compression
    }

    /// Read limit, if any.
    #[must_use]
    pub const fn max_decompressed_bytes(&self) -> Option<usize> {
        self.max_decompressed_bytes
    }
}

impl<S: ArtifactStore> ArtifactStore for CompressedArtifactStore<S> {
    async fn ensure_container(&self, container: &str) -> Result<()> {
        self.inner.ensure_container(container).await
    }

    async fn container_exists(&self, container: &str) -> Result<bool> {
        self.inner.container_exists(container).await
    }

    async fn put(&self, container: &str, key: &str, bytes: Vec<u8>) -> Result<()> {
        let frame = self.compression.compress(&bytes)?;
        tracing::trace!(
            codec = self.compression.as_str(),
            raw = bytes.len(),
            stored = frame.len(),
            "compressed artifact"
        );
        self.inner.put(container, key, frame).await
    }

    async fn get(&self, container: &str, key: &str) -> Result<Option<Vec<u8>>> {
        match self.inner.get(container, key).await? {
            Some(frame) => Ok(Some(Compression::decompress(
                &frame,
                self.max_decompressed_bytes,
            )?)),
            None => Ok(None),
        }
    }

    async fn exists(&self, container: &str, key: &str) -> Result<bool> {
        self.inner.exists(container, key).await
    }

    async fn delete(&self, container: &str, key: &str) -> Result<()> {
        self.inner.delete(container, key).await
    }

    fn uri(&self, container: &str, key: &str) -> String {
        self.inner.uri(container, key)
    }

    async fn copy(
        &self,
        src_container: &str,
        src_key: &str,
        dst_container: &str,
        dst_key: &str,
    ) -> Result<()> {
        self.inner
            .copy(src_container, src_key, dst_container, dst_key)
            .await
    }
}
