//! Container image packaging
//!
//! Builds a model-serving image around a downloaded artifact and pushes it to
//! a registry. Images are named after the experiment and tagged with the
//! registered model version:
//!
//! ```text
//! <registry>/<experiment name, normalised>:<model version>
//! ```
//!
//! Two builders are provided: [`DockerCliContext`] drives the `docker` CLI,
//! [`MemoryImageRegistry`] keeps images in memory.

mod docker;
mod memory;

pub use docker::DockerCliContext;
pub use memory::MemoryImageRegistry;

use std::fmt;
use std::future::Future;

use crate::entities::RegisteredModel;
use crate::{Error, Result};

/// Fully qualified image reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageName {
    registry: String,
    repository: String,
    tag: String,
}

impl ImageName {
    /// Derive the image name for a model of the given experiment.
    ///
    /// The experiment name is lowercased, characters outside `[a-z0-9._-]`
    /// become `-`, runs of separators collapse and leading/trailing
    /// separators are dropped.
    ///
    /// # Errors
    ///
    /// Returns `Error::ImageBuild` if nothing usable is left of the name.
    pub fn new(registry: &str, experiment_name: &str, model: &RegisteredModel) -> Result<Self> {
        let repository = normalize_repository(experiment_name);
        if repository.is_empty() {
            return Err(Error::ImageBuild(format!(
                "experiment name '{experiment_name}' does not yield a valid image repository"
            )));
        }
        Ok(Self {
            registry: registry.trim_end_matches('/').to_string(),
            repository,
            tag: model.version().to_string(),
        })
    }

    /// Registry part.
    #[must_use]
    pub fn registry(&self) -> &str {
        &self.registry
    }

    /// Repository part (normalised experiment name).
    #[must_use]
    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// Tag part (model version).
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl fmt::Display for ImageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.registry.is_empty() {
            write!(f, "{}:{}", self.repository, self.tag)
        } else {
            write!(f, "{}/{}:{}", self.registry, self.repository, self.tag)
        }
    }
}

fn normalize_repository(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars().flat_map(char::to_lowercase) {
        let c = if c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-') {
            c
        } else {
            '-'
        };
        let is_sep = matches!(c, '.' | '_' | '-');
        if is_sep && (out.is_empty() || out.ends_with(['.', '_', '-'])) {
            continue;
        }
        out.push(c);
    }
    while out.ends_with(['.', '_', '-']) {
        out.pop();
    }
    out
}

/// Builds and publishes model images.
pub trait ImageBuilder: Send + Sync {
    /// Registry images are pushed to.
    fn registry(&self) -> &str;

    /// Name of the image for a model of the given experiment.
    ///
    /// # Errors
    ///
    /// See [`ImageName::new`].
    fn image_name(&self, experiment_name: &str, model: &RegisteredModel) -> Result<ImageName> {
        ImageName::new(self.registry(), experiment_name, model)
    }

    /// Build an image embedding `artifact`.
    fn build_image(
        &self,
        experiment_name: &str,
        model: &RegisteredModel,
        artifact: &[u8],
    ) -> impl Future<Output = Result<()>> + Send;

    /// Push a previously built image to the registry.
    fn push_image(
        &self,
        experiment_name: &str,
        model: &RegisteredModel,
    ) -> impl Future<Output = Result<()>> + Send;
}
