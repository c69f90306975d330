//! Shared test doubles for catalog integration tests.
//!
//! Every fake appends to a shared [`CallLog`] so tests can assert on the
//! global order of pipeline steps.

#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use mlops_deploy::buffer::ArtifactBuffer;
use mlops_deploy::catalog::DeploymentCatalog;
use mlops_deploy::entities::{Deployment, DeploymentTarget, Experiment, RegisteredModel};
use mlops_deploy::image::ImageBuilder;
use mlops_deploy::repository::{
    DeploymentRepository, MemoryDeploymentRepository, MemoryExperimentRepository, ModelRepository,
};
use mlops_deploy::{Error, Result};
use uuid::Uuid;

/// Ordered record of collaborator calls.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, call: impl Into<String>) {
        self.0.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }
}

/// Model repository returning canned URIs and artifact bytes.
#[derive(Debug)]
pub struct FakeModelRepository {
    pub log: CallLog,
    pub artifact: Vec<u8>,
    pub deploy_uri_prefix: String,
    pub fail_deploy: bool,
    pub fail_download: bool,
    pub download_delay: Option<Duration>,
}

impl FakeModelRepository {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            artifact: b"model-weights".to_vec(),
            deploy_uri_prefix: "https://store".to_string(),
            fail_deploy: false,
            fail_download: false,
            download_delay: None,
        }
    }
}

impl ModelRepository for FakeModelRepository {
    async fn upload_model(&self, run_id: &str, _file_path: &Path) -> Result<()> {
        self.log.push(format!("upload:{run_id}"));
        Ok(())
    }

    async fn download_model(&self, run_id: &str, destination: &mut ArtifactBuffer) -> Result<()> {
        self.log.push(format!("download:{run_id}"));
        if self.fail_download {
            return Err(Error::ArtifactTransfer("download interrupted".to_string()));
        }
        destination.write_all(&self.artifact)?;
        if let Some(delay) = self.download_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    async fn deploy_model(
        &self,
        _target: &DeploymentTarget,
        model: &RegisteredModel,
        _experiment: &Experiment,
    ) -> Result<String> {
        self.log.push(format!("deploy:{}", model.run_id()));
        if self.fail_deploy {
            return Err(Error::ArtifactTransfer("store unavailable".to_string()));
        }
        Ok(format!("{}/{}", self.deploy_uri_prefix, model.run_id()))
    }

    async fn get_deployment_uri(
        &self,
        experiment: &Experiment,
        target: &DeploymentTarget,
    ) -> Result<String> {
        self.log.push("get_uri");
        Ok(format!(
            "{}/{}/{}",
            self.deploy_uri_prefix,
            experiment.experiment_name(),
            target.name()
        ))
    }
}

/// Image builder recording the bytes it was handed.
#[derive(Debug)]
pub struct FakeImageBuilder {
    pub log: CallLog,
    pub built_with: Mutex<Vec<Vec<u8>>>,
    pub fail_build: bool,
    pub fail_push: bool,
}

impl FakeImageBuilder {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            built_with: Mutex::new(Vec::new()),
            fail_build: false,
            fail_push: false,
        }
    }

    pub fn built_with(&self) -> Vec<Vec<u8>> {
        self.built_with.lock().unwrap().clone()
    }
}

impl ImageBuilder for FakeImageBuilder {
    fn registry(&self) -> &str {
        "registry.test"
    }

    async fn build_image(
        &self,
        experiment_name: &str,
        _model: &RegisteredModel,
        artifact: &[u8],
    ) -> Result<()> {
        self.log.push(format!("build:{experiment_name}"));
        if self.fail_build {
            return Err(Error::ImageBuild("docker build exited with 1".to_string()));
        }
        self.built_with.lock().unwrap().push(artifact.to_vec());
        Ok(())
    }

    async fn push_image(&self, experiment_name: &str, _model: &RegisteredModel) -> Result<()> {
        self.log.push(format!("push:{experiment_name}"));
        if self.fail_push {
            return Err(Error::ImagePush("registry denied".to_string()));
        }
        Ok(())
    }
}

/// Deployment repository delegating to memory, logging record writes and
/// optionally failing them.
#[derive(Debug)]
pub struct LoggingDeploymentRepository {
    pub log: CallLog,
    pub inner: MemoryDeploymentRepository,
    pub fail_create_deployment: bool,
}

impl LoggingDeploymentRepository {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            inner: MemoryDeploymentRepository::new(),
            fail_create_deployment: false,
        }
    }
}

impl DeploymentRepository for LoggingDeploymentRepository {
    async fn create_deployment_target(
        &self,
        name: &str,
        is_production: bool,
    ) -> Result<DeploymentTarget> {
        self.inner.create_deployment_target(name, is_production).await
    }

    async fn get_deployment_targets(&self) -> Result<Vec<DeploymentTarget>> {
        self.inner.get_deployment_targets().await
    }

    async fn create_deployment(
        &self,
        target: &DeploymentTarget,
        model: &RegisteredModel,
        deployed_by: &str,
        deployment_uri: &str,
    ) -> Result<Deployment> {
        self.log.push("record");
        if self.fail_create_deployment {
            return Err(Error::Repository("database is read-only".to_string()));
        }
        self.inner
            .create_deployment(target, model, deployed_by, deployment_uri)
            .await
    }

    async fn get_deployments(&self, experiment_id: Uuid) -> Result<Vec<Deployment>> {
        self.inner.get_deployments(experiment_id).await
    }
}

pub type FakeCatalog = DeploymentCatalog<
    LoggingDeploymentRepository,
    FakeModelRepository,
    MemoryExperimentRepository,
    FakeImageBuilder,
>;

/// Fixture: one known experiment and the collaborators, before assembly.
pub struct Fixture {
    pub log: CallLog,
    pub experiment: Experiment,
    pub deployments: LoggingDeploymentRepository,
    pub models: FakeModelRepository,
    pub experiments: MemoryExperimentRepository,
    pub images: FakeImageBuilder,
}

impl Fixture {
    pub fn new() -> Self {
        let log = CallLog::default();
        let experiment = Experiment::new(Uuid::new_v4(), "churn-classifier");
        let experiments = MemoryExperimentRepository::new();
        experiments.add_experiment(experiment.clone());
        Self {
            deployments: LoggingDeploymentRepository::new(log.clone()),
            models: FakeModelRepository::new(log.clone()),
            images: FakeImageBuilder::new(log.clone()),
            experiments,
            experiment,
            log,
        }
    }

    pub fn model(&self, run_id: &str) -> RegisteredModel {
        RegisteredModel::new(self.experiment.experiment_id(), run_id, 1)
    }

    pub fn into_catalog(self) -> (FakeCatalog, Experiment, CallLog) {
        let catalog =
            DeploymentCatalog::new(self.deployments, self.models, self.experiments, self.images);
        (catalog, self.experiment, self.log)
    }
}
