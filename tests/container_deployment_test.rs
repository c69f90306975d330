//! Containerized deployment pipeline tests.
//!
//! Step order is download -> build -> push -> record, and the artifact buffer
//! is released on every path.

mod common;

use std::time::Duration;

use common::Fixture;
use mlops_deploy::buffer::BufferTracker;
use mlops_deploy::Error;

#[tokio::test]
async fn test_container_pipeline_order() {
    let fixture = Fixture::new();
    let model = fixture.model("run-1");
    let (catalog, _, log) = fixture.into_catalog();
    let target = catalog.create_deployment_target("prod", true).await.unwrap();

    let deployment = catalog
        .deploy_model_to_container(&target, &model, "ci")
        .await
        .unwrap();

    assert_eq!(
        log.calls(),
        vec![
            "download:run-1",
            "build:churn-classifier",
            "push:churn-classifier",
            "record"
        ]
    );
    assert_eq!(deployment.deployment_uri(), "");
    assert_eq!(deployment.deployed_by(), "ci");
}

#[tokio::test]
async fn test_build_receives_downloaded_bytes() {
    let mut fixture = Fixture::new();
    let artifact: Vec<u8> = (0..=255).cycle().take(4096).collect();
    fixture.models.artifact = artifact.clone();
    let model = fixture.model("run-1");
    let (catalog, _, _) = fixture.into_catalog();
    let target = catalog.create_deployment_target("prod", true).await.unwrap();

    catalog
        .deploy_model_to_container(&target, &model, "ci")
        .await
        .unwrap();

    assert_eq!(catalog.image_builder().built_with(), vec![artifact]);
}

#[tokio::test]
async fn test_buffer_released_on_success() {
    let fixture = Fixture::new();
    let model = fixture.model("run-1");
    let (catalog, _, _) = fixture.into_catalog();
    let target = catalog.create_deployment_target("prod", true).await.unwrap();

    catalog
        .deploy_model_to_container(&target, &model, "ci")
        .await
        .unwrap();

    let buffers = catalog.buffer_tracker();
    assert_eq!(buffers.acquired(), 1);
    assert_eq!(buffers.released(), 1);
    assert_eq!(buffers.bytes_in_flight(), 0);
}

#[tokio::test]
async fn test_build_failure_skips_push_and_record() {
    let mut fixture = Fixture::new();
    fixture.images.fail_build = true;
    let model = fixture.model("run-1");
    let (catalog, experiment, log) = fixture.into_catalog();
    let target = catalog.create_deployment_target("prod", true).await.unwrap();

    let err = catalog
        .deploy_model_to_container(&target, &model, "ci")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ImageBuild(_)));
    assert_eq!(log.count("push"), 0);
    assert_eq!(log.count("record"), 0);
    assert_eq!(catalog.buffer_tracker().acquired(), 1);
    assert_eq!(catalog.buffer_tracker().outstanding(), 0);
    assert!(catalog
        .get_deployments(experiment.experiment_id())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_push_failure_creates_no_record_and_releases_buffer() {
    let mut fixture = Fixture::new();
    fixture.images.fail_push = true;
    let model = fixture.model("run-1");
    let (catalog, experiment, log) = fixture.into_catalog();
    let target = catalog.create_deployment_target("prod", true).await.unwrap();

    let err = catalog
        .deploy_model_to_container(&target, &model, "ci")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ImagePush(_)));
    assert_eq!(log.count("build"), 1);
    assert_eq!(log.count("record"), 0);
    assert_eq!(catalog.buffer_tracker().acquired(), 1);
    assert_eq!(catalog.buffer_tracker().released(), 1);
    assert!(catalog
        .get_deployments(experiment.experiment_id())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_download_failure_skips_build() {
    let mut fixture = Fixture::new();
    fixture.models.fail_download = true;
    let model = fixture.model("run-1");
    let (catalog, _, log) = fixture.into_catalog();
    let target = catalog.create_deployment_target("prod", true).await.unwrap();

    let err = catalog
        .deploy_model_to_container(&target, &model, "ci")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ArtifactTransfer(_)));
    assert_eq!(log.calls(), vec!["download:run-1"]);
    assert_eq!(catalog.buffer_tracker().outstanding(), 0);
}

#[tokio::test]
async fn test_record_failure_after_push() {
    let mut fixture = Fixture::new();
    fixture.deployments.fail_create_deployment = true;
    let model = fixture.model("run-1");
    let (catalog, _, log) = fixture.into_catalog();
    let target = catalog.create_deployment_target("prod", true).await.unwrap();

    let err = catalog
        .deploy_model_to_container(&target, &model, "ci")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Repository(_)));
    assert_eq!(log.count("push"), 1);
    assert_eq!(catalog.buffer_tracker().outstanding(), 0);
}

#[tokio::test]
async fn test_cancelled_deployment_releases_buffer() {
    let mut fixture = Fixture::new();
    fixture.models.download_delay = Some(Duration::from_secs(30));
    let model = fixture.model("run-1");
    let (catalog, experiment, log) = fixture.into_catalog();
    let target = catalog.create_deployment_target("prod", true).await.unwrap();

    let result = tokio::time::timeout(
        Duration::from_millis(20),
        catalog.deploy_model_to_container(&target, &model, "ci"),
    )
    .await;

    assert!(result.is_err(), "deployment should still be downloading");
    assert_eq!(catalog.buffer_tracker().acquired(), 1);
    assert_eq!(catalog.buffer_tracker().outstanding(), 0);
    assert_eq!(log.count("build"), 0);
    assert!(catalog
        .get_deployments(experiment.experiment_id())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_concurrent_container_deployments_use_separate_buffers() {
    let fixture = Fixture::new();
    let model = fixture.model("run-1");
    let (catalog, experiment, _) = fixture.into_catalog();
    let target = catalog.create_deployment_target("prod", true).await.unwrap();

    let (a, b) = tokio::join!(
        catalog.deploy_model_to_container(&target, &model, "alice"),
        catalog.deploy_model_to_container(&target, &model, "bob"),
    );
    a.unwrap();
    b.unwrap();

    assert_eq!(catalog.buffer_tracker().acquired(), 2);
    assert_eq!(catalog.buffer_tracker().outstanding(), 0);
    assert_eq!(
        catalog.get_deployments(experiment.experiment_id()).await.unwrap().len(),
        2
    );
}

#[tokio::test]
async fn test_configured_artifact_cap_stops_before_build() {
    let config = mlops_deploy::config::DeploymentConfig::builder()
        .max_artifact_bytes(4)
        .build()
        .unwrap();
    let fixture = Fixture::new();
    let model = fixture.model("run-1");
    let (catalog, _, log) = fixture.into_catalog();
    let catalog = catalog.with_buffer_tracker(BufferTracker::from_config(&config));
    let target = catalog.create_deployment_target("prod", true).await.unwrap();

    let err = catalog
        .deploy_model_to_container(&target, &model, "ci")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ArtifactTransfer(_)));
    assert_eq!(log.calls(), vec!["download:run-1"]);
    assert_eq!(catalog.buffer_tracker().outstanding(), 0);
}
