//! Error types for mlops-deploy
//!
//! Every failure is surfaced to the caller unmodified. Nothing in this crate
//! retries or recovers silently.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Deployment pipeline error types
#[derive(Error, Debug)]
pub enum Error {
    /// A referenced experiment, model, target or artifact does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of entity that was looked up (e.g. "experiment")
        entity: &'static str,
        /// Identifier used for the lookup
        id: String,
    },

    /// Metadata persistence failed
    #[error("Repository error: {0}")]
    Repository(String),

    /// Artifact upload, download or copy failed
    #[error("Artifact transfer failed: {0}")]
    ArtifactTransfer(String),

    /// Container image build failed
    #[error("Image build failed: {0}")]
    ImageBuild(String),

    /// Container image push failed
    #[error("Image push failed: {0}")]
    ImagePush(String),

    /// Configuration is missing or malformed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build a `NotFound` error for the given entity kind and identifier.
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Whether this error reports a missing entity.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
