//! Deployment Pipeline Demo
//!
//! Run with: `cargo run --example deploy_pipeline`
//!
//! Uploads a fake model artifact into a filesystem artifact store, deploys it
//! directly and as a container image (in-memory registry), then prints the
//! deployment history.

use mlops_deploy::artifact::FsArtifactStore;
use mlops_deploy::buffer::BufferTracker;
use mlops_deploy::catalog::DeploymentCatalog;
use mlops_deploy::config::DeploymentConfig;
use mlops_deploy::entities::{Experiment, RegisteredModel};
use mlops_deploy::image::{ImageBuilder, MemoryImageRegistry};
use mlops_deploy::repository::{
    ArtifactModelRepository, MemoryDeploymentRepository, MemoryExperimentRepository,
    ModelRepository,
};
use mlops_deploy::telemetry::init_tracing;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("mlops_deploy=info");
    println!("=== mlops-deploy Pipeline Demo ===\n");

    let workdir = tempfile::tempdir()?;
    let config = DeploymentConfig::builder()
        .artifact_root(workdir.path())
        .registry("registry.demo.local")
        .max_artifact_bytes(16 * 1024 * 1024)
        .build()?
        .apply_env_overrides()?;

    let experiments = MemoryExperimentRepository::new();
    let experiment = Experiment::new(Uuid::new_v4(), "Churn Classifier");
    experiments.add_experiment(experiment.clone());
    let model = RegisteredModel::builder(experiment.experiment_id(), "run-2024-001")
        .version(3)
        .registered_by("data-science")
        .build();
    experiments.add_registered_model(model);
    let model = experiments
        .registered_models_for_experiment(experiment.experiment_id())
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("no registered model"))?;

    let models = ArtifactModelRepository::from_config(
        FsArtifactStore::new(&config.artifact_root),
        &config,
    );
    let model_file = workdir.path().join("model.zip");
    tokio::fs::write(&model_file, vec![42u8; 64 * 1024]).await?;
    println!("1. Uploading artifact for {}", model.run_id());
    models.upload_model(model.run_id(), &model_file).await?;

    let catalog = DeploymentCatalog::new(
        MemoryDeploymentRepository::new(),
        models,
        experiments,
        MemoryImageRegistry::new(&config.registry),
    )
    .with_buffer_tracker(BufferTracker::from_config(&config));

    let staging = catalog.create_deployment_target("staging", false).await?;
    let production = catalog.create_deployment_target("production", true).await?;
    println!("2. Targets: {}, {}", staging.name(), production.name());

    let direct = catalog.deploy_model(&staging, &model, "alice").await?;
    println!("3. Direct deployment -> {}", direct.deployment_uri());

    let container = catalog
        .deploy_model_to_container(&production, &model, "release-bot")
        .await?;
    let image = catalog
        .image_builder()
        .image_name(experiment.experiment_name(), &model)?;
    println!(
        "4. Container deployment -> image {image}, uri '{}'",
        container.deployment_uri()
    );

    println!("\nDeployment history:");
    for deployment in catalog.get_deployments(experiment.experiment_id()).await? {
        println!(
            "   {} by {:<12} uri={}",
            deployment.deployed_at().format("%H:%M:%S"),
            deployment.deployed_by(),
            deployment.deployment_uri()
        );
    }

    let buffers = catalog.buffer_tracker();
    println!(
        "\nBuffers acquired={} released={}",
        buffers.acquired(),
        buffers.released()
    );
    Ok(())
}
