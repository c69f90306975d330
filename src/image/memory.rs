//! In-memory image registry.
//!
//! Keeps built images and pushed images in separate maps, so a push of an
//! image that was never built is rejected the same way a real registry
//! rejects an unknown local image.

use dashmap::DashMap;

use super::{ImageBuilder, ImageName};
use crate::entities::RegisteredModel;
use crate::{Error, Result};

/// `ImageBuilder` that records images instead of building them.
#[derive(Debug)]
pub struct MemoryImageRegistry {
    registry: String,
    built: DashMap<String, Vec<u8>>,
    pushed: DashMap<String, Vec<u8>>,
}

impl MemoryImageRegistry {
    /// Create an empty registry with the given name.
    #[must_use]
    pub fn new(registry: impl Into<String>) -> Self {
        Self {
            registry: registry.into(),
            built: DashMap::new(),
            pushed: DashMap::new(),
        }
    }

    /// Whether the image has been built locally.
    #[must_use]
    pub fn is_built(&self, image: &ImageName) -> bool {
        self.built.contains_key(&image.to_string())
    }

    /// Whether the image has been pushed.
    #[must_use]
    pub fn is_pushed(&self, image: &ImageName) -> bool {
        self.pushed.contains_key(&image.to_string())
    }

    /// Artifact embedded in a pushed image.
    #[must_use]
    pub fn pushed_artifact(&self, image: &ImageName) -> Option<Vec<u8>> {
        self.pushed
            .get(&image.to_string())
            .map(|a| a.value().clone())
    }

    /// Number of pushed images.
    #[must_use]
    pub fn pushed_count(&self) -> usize {
        self.pushed.len()
    }
}

impl Default for MemoryImageRegistry {
    fn default() -> Self {
        Self::new("localhost:5000")
    }
}

impl ImageBuilder for MemoryImageRegistry {
    fn registry(&self) -> &str {
        &self.registry
    }

    async fn build_image(
        &self,
        experiment_name: &str,
        model: &RegisteredModel,
        artifact: &[u8],
    ) -> Result<()> {
        let image = self.image_name(experiment_name, model)?;
        self.built.insert(image.to_string(), artifact.to_vec());
        Ok(())
    }

    async fn push_image(&self, experiment_name: &str, model: &RegisteredModel) -> Result<()> {
        let image = self.image_name(experiment_name, model)?.to_string();
        let artifact = self
            .built
            .get(&image)
            .map(|a| a.value().clone())
            .ok_or_else(|| Error::ImagePush(format!("image {image} has not been built")))?;
        self.pushed.insert(image, artifact);
        Ok(())
    }
}
