//! Deployment catalog - the orchestration pipeline.
//!
//! The catalog sequences calls across four collaborators:
//!
//! ```text
//! caller ──> DeploymentCatalog ──> ExperimentRepository   (lookup)
//!                    │         ──> ModelRepository        (artifact transfer)
//!                    │         ──> ImageBuilder           (build, push)
//!                    │         ──> ClusterDeployer        (address resolution)
//!                    └────────> DeploymentRepository      (record, always last)
//! ```
//!
//! A deployment record is only written once every preceding side effect has
//! succeeded. Nothing is retried or rolled back: a failure after an artifact
//! copy or image push leaves that side effect in place without a record.

use std::future::Future;

use uuid::Uuid;

use crate::buffer::BufferTracker;
use crate::entities::{Deployment, DeploymentTarget, RegisteredModel};
use crate::image::{ImageBuilder, ImageName};
use crate::repository::{DeploymentRepository, ExperimentRepository, ModelRepository};
use crate::Result;

/// Resolves the address of a pushed image once it runs on a target.
///
/// Rolling images out to a cluster is not handled by this crate; plug an
/// implementation in here to populate container deployment URIs.
pub trait ClusterDeployer: Send + Sync {
    /// Deploy `image` to `target` and return its address.
    fn deploy(
        &self,
        target: &DeploymentTarget,
        image: &ImageName,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// Cluster deployer that deploys nothing and resolves an empty URI.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopClusterDeployer;

impl ClusterDeployer for NoopClusterDeployer {
    async fn deploy(&self, target: &DeploymentTarget, image: &ImageName) -> Result<String> {
        tracing::debug!(
            deployment_target = target.name(),
            image = %image,
            "no cluster deployer configured"
        );
        Ok(String::new())
    }
}

/// Public entry point for deploying registered models.
///
/// # Example
///
/// ```rust
/// use mlops_deploy::artifact::MemoryArtifactStore;
/// use mlops_deploy::catalog::DeploymentCatalog;
/// use mlops_deploy::entities::{Experiment, RegisteredModel};
/// use mlops_deploy::image::MemoryImageRegistry;
/// use mlops_deploy::repository::{
///     ArtifactModelRepository, MemoryDeploymentRepository, MemoryExperimentRepository,
/// };
/// use uuid::Uuid;
///
/// # async fn example() -> mlops_deploy::Result<()> {
/// let experiments = MemoryExperimentRepository::new();
/// let experiment = Experiment::new(Uuid::new_v4(), "churn");
/// experiments.add_experiment(experiment.clone());
///
/// let models = ArtifactModelRepository::new(MemoryArtifactStore::new());
/// models.upload_model_bytes("run-1", b"weights".to_vec()).await?;
///
/// let catalog = DeploymentCatalog::new(
///     MemoryDeploymentRepository::new(),
///     models,
///     experiments,
///     MemoryImageRegistry::default(),
/// );
///
/// let target = catalog.create_deployment_target("staging", false).await?;
/// let model = RegisteredModel::new(experiment.experiment_id(), "run-1", 1);
/// let deployment = catalog.deploy_model(&target, &model, "alice").await?;
/// assert_eq!(deployment.deployment_uri(), "memory://deployment/churn/staging/churn.zip");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DeploymentCatalog<D, M, E, I, C = NoopClusterDeployer> {
    deployment_repository: D,
    model_repository: M,
    experiment_repository: E,
    image_builder: I,
    cluster_deployer: C,
    buffers: BufferTracker,
}

impl<D, M, E, I> DeploymentCatalog<D, M, E, I>
where
    D: DeploymentRepository,
    M: ModelRepository,
    E: ExperimentRepository,
    I: ImageBuilder,
{
    /// Create a catalog without a cluster deployer and with an uncapped
    /// buffer tracker.
    #[must_use]
    pub fn new(
        deployment_repository: D,
        model_repository: M,
        experiment_repository: E,
        image_builder: I,
    ) -> Self {
        Self {
            deployment_repository,
            model_repository,
            experiment_repository,
            image_builder,
            cluster_deployer: NoopClusterDeployer,
            buffers: BufferTracker::new(),
        }
    }
}

impl<D, M, E, I, C> DeploymentCatalog<D, M, E, I, C>
where
    D: DeploymentRepository,
    M: ModelRepository,
    E: ExperimentRepository,
    I: ImageBuilder,
    C: ClusterDeployer,
{
    /// Replace the cluster deployer.
    #[must_use]
    pub fn with_cluster_deployer<C2: ClusterDeployer>(
        self,
        cluster_deployer: C2,
    ) -> DeploymentCatalog<D, M, E, I, C2> {
        DeploymentCatalog {
            deployment_repository: self.deployment_repository,
            model_repository: self.model_repository,
            experiment_repository: self.experiment_repository,
            image_builder: self.image_builder,
            cluster_deployer,
            buffers: self.buffers,
        }
    }

    /// Replace the buffer tracker used for container deployments.
    #[must_use]
    pub fn with_buffer_tracker(mut self, buffers: BufferTracker) -> Self {
        self.buffers = buffers;
        self
    }

    /// Tracker of artifact buffers acquired by container deployments.
    #[must_use]
    pub const fn buffer_tracker(&self) -> &BufferTracker {
        &self.buffers
    }

    /// Deployment repository.
    #[must_use]
    pub const fn deployment_repository(&self) -> &D {
        &self.deployment_repository
    }

    /// Model repository.
    #[must_use]
    pub const fn model_repository(&self) -> &M {
        &self.model_repository
    }

    /// Experiment repository.
    #[must_use]
    pub const fn experiment_repository(&self) -> &E {
        &self.experiment_repository
    }

    /// Image builder.
    #[must_use]
    pub const fn image_builder(&self) -> &I {
        &self.image_builder
    }

    /// Create and persist a deployment target.
    ///
    /// Duplicate names are allowed.
    ///
    /// # Errors
    ///
    /// Returns the repository's error (typically `Error::Repository`).
    #[tracing::instrument(skip(self), err)]
    pub async fn create_deployment_target(
        &self,
        name: &str,
        is_production: bool,
    ) -> Result<DeploymentTarget> {
        let target = self
            .deployment_repository
            .create_deployment_target(name, is_production)
            .await?;
        tracing::info!(id = %target.deployment_target_id(), "created deployment target");
        Ok(target)
    }

    /// All deployment targets, in persisted order.
    ///
    /// # Errors
    ///
    /// Returns the repository's error.
    pub async fn get_deployment_targets(&self) -> Result<Vec<DeploymentTarget>> {
        self.deployment_repository.get_deployment_targets().await
    }

    /// Deploy a registered model's artifact to a target and record it.
    ///
    /// The returned record carries the URI reported by the model repository.
    ///
    /// # Errors
    ///
    /// - `Error::NotFound` if the model's experiment does not exist
    /// - the model repository's error if the deploy step fails (no record)
    /// - the deployment repository's error if recording fails (artifact
    ///   stays deployed)
    #[tracing::instrument(
        skip_all,
        fields(
            deployment_target = target.name(),
            run_id = model.run_id(),
            deployed_by = %deployed_by
        ),
        err
    )]
    pub async fn deploy_model(
        &self,
        target: &DeploymentTarget,
        model: &RegisteredModel,
        deployed_by: &str,
    ) -> Result<Deployment> {
        let experiment = self
            .experiment_repository
            .get_experiment(model.experiment_id())
            .await?;

        let deployment_uri = self
            .model_repository
            .deploy_model(target, model, &experiment)
            .await?;
        tracing::debug!(uri = %deployment_uri, "model artifact deployed");

        let deployment = self
            .deployment_repository
            .create_deployment(target, model, deployed_by, &deployment_uri)
            .await?;
        tracing::info!(
            deployment_id = %deployment.deployment_id(),
            uri = %deployment_uri,
            "recorded deployment"
        );
        Ok(deployment)
    }

    /// Package a registered model into a container image, push it and record
    /// the deployment.
    ///
    /// The artifact is downloaded into a buffer from the catalog's
    /// [`BufferTracker`], released as soon as the build step returns. The push
    /// only runs after a successful build and the record is only written after
    /// a successful push.
    ///
    /// # Errors
    ///
    /// - `Error::NotFound` if the experiment or the run's artifact is missing
    /// - `Error::ArtifactTransfer` if the download fails or exceeds the buffer cap
    /// - `Error::ImageBuild` / `Error::ImagePush` from the image builder
    /// - the cluster deployer's or deployment repository's error
    #[tracing::instrument(
        skip_all,
        fields(
            deployment_target = target.name(),
            run_id = model.run_id(),
            deployed_by = %deployed_by,
            image
        ),
        err
    )]
    pub async fn deploy_model_to_container(
        &self,
        target: &DeploymentTarget,
        model: &RegisteredModel,
        deployed_by: &str,
    ) -> Result<Deployment> {
        let experiment = self
            .experiment_repository
            .get_experiment(model.experiment_id())
            .await?;
        let namespace = experiment.experiment_name();
        let image = self.image_builder.image_name(namespace, model)?;
        tracing::Span::current().record("image", tracing::field::display(&image));

        {
            let mut buffer = self.buffers.acquire();
            self.model_repository
                .download_model(model.run_id(), &mut buffer)
                .await?;
            tracing::debug!(size = buffer.len(), "downloaded model artifact");

            self.image_builder
                .build_image(namespace, model, buffer.as_bytes())
                .await?;
        }

        self.image_builder.push_image(namespace, model).await?;

        let deployment_uri = self.cluster_deployer.deploy(target, &image).await?;

        let deployment = self
            .deployment_repository
            .create_deployment(target, model, deployed_by, &deployment_uri)
            .await?;
        tracing::info!(
            deployment_id = %deployment.deployment_id(),
            "recorded container deployment"
        );
        Ok(deployment)
    }

    /// URI of the experiment's model deployed to `target`.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if the experiment is unknown; the model
    /// repository is not consulted in that case.
    #[tracing::instrument(skip(self, target), fields(deployment_target = target.name()), err)]
    pub async fn get_deployment_uri(
        &self,
        experiment_id: Uuid,
        target: &DeploymentTarget,
    ) -> Result<String> {
        let experiment = self.experiment_repository.get_experiment(experiment_id).await?;
        self.model_repository
            .get_deployment_uri(&experiment, target)
            .await
    }

    /// Deployment records of an experiment, in repository order.
    ///
    /// # Errors
    ///
    /// Returns the repository's error.
    pub async fn get_deployments(&self, experiment_id: Uuid) -> Result<Vec<Deployment>> {
        self.deployment_repository.get_deployments(experiment_id).await
    }
}
