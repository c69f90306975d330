//! Scoped in-memory artifact buffers.
//!
//! Containerized deployments download the model artifact into memory before
//! handing it to the image builder. Each download gets its own
//! [`ArtifactBuffer`], released when it is dropped, so every exit path of the
//! pipeline (success, early `?` return, cancelled future) frees it.
//!
//! A [`BufferTracker`] counts acquired and released buffers and the bytes they
//! hold, and can cap the size of a single buffer so an oversized artifact fails
//! the transfer instead of exhausting memory.
//!
//! ```rust
//! use mlops_deploy::buffer::BufferTracker;
//!
//! let tracker = BufferTracker::new();
//! {
//!     let mut buffer = tracker.acquire();
//!     buffer.write_all(b"model bytes").unwrap();
//!     assert_eq!(tracker.outstanding(), 1);
//! }
//! assert_eq!(tracker.outstanding(), 0);
//! ```

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::config::DeploymentConfig;
use crate::{Error, Result};

#[derive(Debug, Default)]
struct TrackerState {
    acquired: AtomicU64,
    released: AtomicU64,
    bytes_in_flight: AtomicUsize,
}

/// Hands out [`ArtifactBuffer`]s and keeps count of them.
///
/// Cloning a tracker shares its counters.
#[derive(Debug, Clone, Default)]
pub struct BufferTracker {
    state: Arc<TrackerState>,
    max_bytes: Option<usize>,
}

impl BufferTracker {
    /// Create a tracker with no size cap.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tracker whose buffers refuse to grow past `max_bytes`.
    #[must_use]
    pub fn with_max_bytes(max_bytes: usize) -> Self {
        Self {
            state: Arc::default(),
            max_bytes: Some(max_bytes),
        }
    }

    /// Create a tracker capped by `max_artifact_bytes` of the configuration.
    #[must_use]
    pub fn from_config(config: &DeploymentConfig) -> Self {
        Self {
            state: Arc::default(),
            max_bytes: config.max_artifact_bytes,
        }
    }

    /// Per-buffer size cap, if any.
    #[must_use]
    pub const fn max_bytes(&self) -> Option<usize> {
        self.max_bytes
    }

    /// Acquire a fresh, empty buffer owned by the caller.
    #[must_use]
    pub fn acquire(&self) -> ArtifactBuffer {
        self.state.acquired.fetch_add(1, Ordering::SeqCst);
        tracing::trace!(outstanding = self.outstanding(), "artifact buffer acquired");
        ArtifactBuffer {
            bytes: Vec::new(),
            max_bytes: self.max_bytes,
            state: Some(Arc::clone(&self.state)),
        }
    }

    /// Number of buffers handed out so far.
    #[must_use]
    pub fn acquired(&self) -> u64 {
        self.state.acquired.load(Ordering::SeqCst)
    }

    /// Number of buffers dropped so far.
    #[must_use]
    pub fn released(&self) -> u64 {
        self.state.released.load(Ordering::SeqCst)
    }

    /// Buffers acquired but not yet released.
    #[must_use]
    pub fn outstanding(&self) -> u64 {
        self.acquired().saturating_sub(self.released())
    }

    /// Bytes currently held by outstanding buffers.
    #[must_use]
    pub fn bytes_in_flight(&self) -> usize {
        self.state.bytes_in_flight.load(Ordering::SeqCst)
    }
}

/// Exclusively owned in-memory artifact bytes.
///
/// Not `Clone`: a buffer belongs to the single call that acquired it.
#[derive(Debug, Default)]
pub struct ArtifactBuffer {
    bytes: Vec<u8>,
    max_bytes: Option<usize>,
    state: Option<Arc<TrackerState>>,
}

impl ArtifactBuffer {
    /// Create an untracked, uncapped buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `data` to the buffer.
    ///
    /// # Errors
    ///
    /// Returns `Error::ArtifactTransfer` if the buffer would exceed its cap.
    /// The buffer is left unchanged in that case.
    pub fn write_all(&mut self, data: &[u8]) -> Result<()> {
        let new_len = self.bytes.len() + data.len();
        if let Some(max) = self.max_bytes {
            if new_len > max {
                return Err(Error::ArtifactTransfer(format!(
                    "artifact of at least {new_len} bytes exceeds buffer limit of {max} bytes"
                )));
            }
        }
        self.bytes.extend_from_slice(data);
        if let Some(state) = &self.state {
            state.bytes_in_flight.fetch_add(data.len(), Ordering::SeqCst);
        }
        Ok(())
    }

    /// Borrow the buffered bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of buffered bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether nothing has been written yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl Drop for ArtifactBuffer {
    fn drop(&mut self) {
        if let Some(state) = self.state.take() {
            state
                .bytes_in_flight
                .fetch_sub(self.bytes.len(), Ordering::SeqCst);
            state.released.fetch_add(1, Ordering::SeqCst);
            tracing::trace!(bytes = self.bytes.len(), "artifact buffer released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_and_release() {
        let tracker = BufferTracker::new();
        let buffer = tracker.acquire();
        assert_eq!(tracker.acquired(), 1);
        assert_eq!(tracker.outstanding(), 1);

        drop(buffer);
        assert_eq!(tracker.released(), 1);
        assert_eq!(tracker.outstanding(), 0);
    }

    #[test]
    fn test_bytes_in_flight() {
        let tracker = BufferTracker::new();
        let mut a = tracker.acquire();
        let mut b = tracker.acquire();
        a.write_all(&[1, 2, 3]).unwrap();
        b.write_all(&[4, 5]).unwrap();
        assert_eq!(tracker.bytes_in_flight(), 5);

        drop(a);
        assert_eq!(tracker.bytes_in_flight(), 2);
        drop(b);
        assert_eq!(tracker.bytes_in_flight(), 0);
    }

    #[test]
    fn test_cap_rejects_oversized_write() {
        let tracker = BufferTracker::with_max_bytes(4);
        let mut buffer = tracker.acquire();
        buffer.write_all(&[0; 4]).unwrap();

        let err = buffer.write_all(&[0]).unwrap_err();
        assert!(matches!(err, Error::ArtifactTransfer(_)));
        assert_eq!(buffer.len(), 4);
    }

    #[test]
    fn test_untracked_buffer() {
        let mut buffer = ArtifactBuffer::new();
        assert!(buffer.is_empty());
        buffer.write_all(b"abc").unwrap();
        assert_eq!(buffer.as_bytes(), b"abc");
    }

    #[test]
    fn test_from_config_applies_cap() {
        let config = DeploymentConfig::builder()
            .max_artifact_bytes(8)
            .build()
            .unwrap();
        let tracker = BufferTracker::from_config(&config);
        assert_eq!(tracker.max_bytes(), Some(8));

        let mut buffer = tracker.acquire();
        assert!(buffer.write_all(&[0; 9]).is_err());
        assert_eq!(BufferTracker::from_config(&DeploymentConfig::default()).max_bytes(), None);
    }

    #[test]
    fn test_cloned_tracker_shares_counters() {
        let tracker = BufferTracker::new();
        let clone = tracker.clone();
        let _buffer = clone.acquire();
        assert_eq!(tracker.outstanding(), 1);
    }
}
