//! Metadata and model repositories consumed by the deployment catalog.
//!
//! The catalog only sees these three narrow traits. In-memory implementations
//! live in this module; [`ArtifactModelRepository`] implements the model side
//! on top of any [`ArtifactStore`](crate::artifact::ArtifactStore).

mod artifact_model;
mod memory;

pub use artifact_model::ArtifactModelRepository;
pub use memory::{MemoryDeploymentRepository, MemoryExperimentRepository};

use std::future::Future;
use std::path::Path;

use uuid::Uuid;

use crate::buffer::ArtifactBuffer;
use crate::entities::{Deployment, DeploymentTarget, Experiment, RegisteredModel};
use crate::Result;

/// Experiment lookup.
pub trait ExperimentRepository: Send + Sync {
    /// Fetch an experiment by ID.
    ///
    /// Fails with `Error::NotFound` if the experiment does not exist.
    fn get_experiment(
        &self,
        experiment_id: Uuid,
    ) -> impl Future<Output = Result<Experiment>> + Send;
}

/// Deployment target registry and deployment record persistence.
pub trait DeploymentRepository: Send + Sync {
    /// Persist a new deployment target. Names need not be unique.
    fn create_deployment_target(
        &self,
        name: &str,
        is_production: bool,
    ) -> impl Future<Output = Result<DeploymentTarget>> + Send;

    /// All known targets, in persisted order.
    fn get_deployment_targets(&self) -> impl Future<Output = Result<Vec<DeploymentTarget>>> + Send;

    /// Append a deployment record.
    fn create_deployment(
        &self,
        target: &DeploymentTarget,
        model: &RegisteredModel,
        deployed_by: &str,
        deployment_uri: &str,
    ) -> impl Future<Output = Result<Deployment>> + Send;

    /// Deployment records of models belonging to the experiment.
    fn get_deployments(
        &self,
        experiment_id: Uuid,
    ) -> impl Future<Output = Result<Vec<Deployment>>> + Send;
}

/// Model artifact transfer.
pub trait ModelRepository: Send + Sync {
    /// Upload the artifact file produced by a run.
    fn upload_model(
        &self,
        run_id: &str,
        file_path: &Path,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Download a run's artifact into `destination`.
    fn download_model(
        &self,
        run_id: &str,
        destination: &mut ArtifactBuffer,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Make the model's artifact reachable for the target and return its URI.
    fn deploy_model(
        &self,
        target: &DeploymentTarget,
        model: &RegisteredModel,
        experiment: &Experiment,
    ) -> impl Future<Output = Result<String>> + Send;

    /// URI under which the experiment's model is deployed for the target.
    fn get_deployment_uri(
        &self,
        experiment: &Experiment,
        target: &DeploymentTarget,
    ) -> impl Future<Output = Result<String>> + Send;
}
