//! Model repository backed by an artifact store.
//!
//! Layout:
//!
//! ```text
//! <model_container>/<run_id>.zip                          uploaded run output
//! <deployment_container>/<experiment>/<target>/<experiment>.zip   deployed copy
//! ```

use std::path::Path;

use super::ModelRepository;
use crate::artifact::ArtifactStore;
use crate::buffer::ArtifactBuffer;
use crate::config::DeploymentConfig;
use crate::entities::{DeploymentTarget, Experiment, RegisteredModel};
use crate::{Error, Result};

const MODEL_EXTENSION: &str = "zip";

/// `ModelRepository` storing run artifacts and deployed copies in an
/// [`ArtifactStore`].
#[derive(Debug)]
pub struct ArtifactModelRepository<S: ArtifactStore> {
    store: S,
    model_container: String,
    deployment_container: String,
}

impl<S: ArtifactStore> ArtifactModelRepository<S> {
    /// Create a repository with the default container names.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::from_config(store, &DeploymentConfig::default())
    }

    /// Create a repository using the container names from `config`.
    #[must_use]
    pub fn from_config(store: S, config: &DeploymentConfig) -> Self {
        Self {
            store,
            model_container: config.model_container.clone(),
            deployment_container: config.deployment_container.clone(),
        }
    }

    /// Underlying artifact store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Container holding uploaded run artifacts.
    #[must_use]
    pub fn model_container(&self) -> &str {
        &self.model_container
    }

    /// Container holding deployed copies.
    #[must_use]
    pub fn deployment_container(&self) -> &str {
        &self.deployment_container
    }

    /// Upload an in-memory artifact for a run, creating the model container
    /// if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `Error::ArtifactTransfer` if the store rejects the write.
    pub async fn upload_model_bytes(&self, run_id: &str, bytes: Vec<u8>) -> Result<()> {
        self.store.ensure_container(&self.model_container).await?;
        let key = model_key(run_id);
        let size = bytes.len();
        self.store.put(&self.model_container, &key, bytes).await?;
        tracing::info!(run_id, size, container = %self.model_container, "uploaded model artifact");
        Ok(())
    }
}

fn model_key(run_id: &str) -> String {
    format!("{run_id}.{MODEL_EXTENSION}")
}

fn deployment_key(experiment: &Experiment, target: &DeploymentTarget) -> String {
    let name = experiment.experiment_name();
    format!("{name}/{}/{name}.{MODEL_EXTENSION}", target.name())
}

impl<S: ArtifactStore> ModelRepository for ArtifactModelRepository<S> {
    async fn upload_model(&self, run_id: &str, file_path: &Path) -> Result<()> {
        let bytes = tokio::fs::read(file_path).await.map_err(|e| {
            Error::ArtifactTransfer(format!(
                "failed to read model file {}: {e}",
                file_path.display()
            ))
        })?;
        self.upload_model_bytes(run_id, bytes).await
    }

    async fn download_model(&self, run_id: &str, destination: &mut ArtifactBuffer) -> Result<()> {
        let key = model_key(run_id);
        let bytes = self
            .store
            .get(&self.model_container, &key)
            .await?
            .ok_or_else(|| Error::not_found("model artifact", run_id))?;
        destination.write_all(&bytes)?;
        tracing::debug!(run_id, size = bytes.len(), "downloaded model artifact");
        Ok(())
    }

    async fn deploy_model(
        &self,
        target: &DeploymentTarget,
        model: &RegisteredModel,
        experiment: &Experiment,
    ) -> Result<String> {
        self.store.ensure_container(&self.deployment_container).await?;
        let destination = deployment_key(experiment, target);
        self.store
            .copy(
                &self.model_container,
                &model_key(model.run_id()),
                &self.deployment_container,
                &destination,
            )
            .await?;
        Ok(self.store.uri(&self.deployment_container, &destination))
    }

    async fn get_deployment_uri(
        &self,
        experiment: &Experiment,
        target: &DeploymentTarget,
    ) -> Result<String> {
        Ok(self
            .store
            .uri(&self.deployment_container, &deployment_key(experiment, target)))
    }
}
