//! In-memory metadata repositories.
//!
//! Experiments and registered models are keyed in `DashMap`s. Targets and
//! deployments keep insertion order, since callers rely on "order as
//! persisted".

use std::sync::RwLock;

use dashmap::DashMap;
use uuid::Uuid;

use super::{DeploymentRepository, ExperimentRepository};
use crate::entities::{Deployment, DeploymentTarget, Experiment, RegisteredModel};
use crate::{Error, Result};

/// In-memory experiment and registered model lookup.
#[derive(Debug, Default)]
pub struct MemoryExperimentRepository {
    experiments: DashMap<Uuid, Experiment>,
    registered_models: DashMap<Uuid, RegisteredModel>,
}

impl MemoryExperimentRepository {
    /// Create a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an experiment, replacing one with the same ID.
    pub fn add_experiment(&self, experiment: Experiment) {
        self.experiments.insert(experiment.experiment_id(), experiment);
    }

    /// Add a registered model.
    pub fn add_registered_model(&self, model: RegisteredModel) {
        self.registered_models
            .insert(model.registered_model_id(), model);
    }

    /// Registered models of an experiment, newest version first.
    #[must_use]
    pub fn registered_models_for_experiment(&self, experiment_id: Uuid) -> Vec<RegisteredModel> {
        let mut models: Vec<RegisteredModel> = self
            .registered_models
            .iter()
            .filter(|m| m.experiment_id() == experiment_id)
            .map(|m| m.value().clone())
            .collect();
        models.sort_by(|a, b| b.version().cmp(&a.version()));
        models
    }
}

impl ExperimentRepository for MemoryExperimentRepository {
    async fn get_experiment(&self, experiment_id: Uuid) -> Result<Experiment> {
        self.experiments
            .get(&experiment_id)
            .map(|e| e.value().clone())
            .ok_or_else(|| Error::not_found("experiment", experiment_id))
    }
}

/// In-memory deployment target registry and append-only deployment log.
#[derive(Debug, Default)]
pub struct MemoryDeploymentRepository {
    targets: RwLock<Vec<DeploymentTarget>>,
    deployments: RwLock<Vec<Deployment>>,
}

fn poisoned<T>(_: T) -> Error {
    Error::Repository("deployment repository lock poisoned".to_string())
}

impl MemoryDeploymentRepository {
    /// Create a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of deployment records across all experiments.
    ///
    /// # Errors
    ///
    /// Returns `Error::Repository` if the log lock is poisoned.
    pub fn deployment_count(&self) -> Result<usize> {
        Ok(self.deployments.read().map_err(poisoned)?.len())
    }
}

impl DeploymentRepository for MemoryDeploymentRepository {
    async fn create_deployment_target(
        &self,
        name: &str,
        is_production: bool,
    ) -> Result<DeploymentTarget> {
        let target = DeploymentTarget::new(name, is_production);
        self.targets.write().map_err(poisoned)?.push(target.clone());
        Ok(target)
    }

    async fn get_deployment_targets(&self) -> Result<Vec<DeploymentTarget>> {
        Ok(self.targets.read().map_err(poisoned)?.clone())
    }

    async fn create_deployment(
        &self,
        target: &DeploymentTarget,
        model: &RegisteredModel,
        deployed_by: &str,
        deployment_uri: &str,
    ) -> Result<Deployment> {
        let deployment = Deployment::new(target, model, deployed_by, deployment_uri);
        self.deployments
            .write()
            .map_err(poisoned)?
            .push(deployment.clone());
        Ok(deployment)
    }

    async fn get_deployments(&self, experiment_id: Uuid) -> Result<Vec<Deployment>> {
        Ok(self
            .deployments
            .read()
            .map_err(poisoned)?
            .iter()
            .filter(|d| d.experiment_id() == experiment_id)
            .cloned()
            .collect())
    }
}
