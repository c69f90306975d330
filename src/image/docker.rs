//! Image builder driving the `docker` CLI.
//!
//! Each build writes the artifact and a generated Dockerfile into a fresh
//! temporary build context that is removed when the build returns.

use std::path::Path;

use tokio::process::Command;

use super::{ImageBuilder, ImageName};
use crate::config::DeploymentConfig;
use crate::entities::RegisteredModel;
use crate::{Error, Result};

const ARTIFACT_FILE: &str = "model.zip";

/// `ImageBuilder` that shells out to `docker build` and `docker push`.
///
/// Registry authentication is expected to be configured outside this crate
/// (`docker login`).
#[derive(Debug, Clone)]
pub struct DockerCliContext {
    docker_binary: String,
    registry: String,
    base_image: String,
}

impl DockerCliContext {
    /// Create a context from explicit settings.
    #[must_use]
    pub fn new(
        docker_binary: impl Into<String>,
        registry: impl Into<String>,
        base_image: impl Into<String>,
    ) -> Self {
        Self {
            docker_binary: docker_binary.into(),
            registry: registry.into(),
            base_image: base_image.into(),
        }
    }

    /// Create a context from the deployment configuration.
    #[must_use]
    pub fn from_config(config: &DeploymentConfig) -> Self {
        Self::new(&config.docker_binary, &config.registry, &config.base_image)
    }

    async fn run_docker(&self, args: &[&str], wrap: fn(String) -> Error) -> Result<String> {
        let output = Command::new(&self.docker_binary)
            .args(args)
            .output()
            .await
            .map_err(|e| wrap(format!("failed to run {}: {e}", self.docker_binary)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(wrap(format!(
                "{} {} failed (exit {}): {}",
                self.docker_binary,
                args.join(" "),
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Quote a `LABEL` value. Backslashes and quotes are escaped; control
/// characters would end the instruction early and are rejected.
fn label_value(name: &str, value: &str) -> Result<String> {
    if value.chars().any(char::is_control) {
        return Err(Error::ImageBuild(format!(
            "{name} contains control characters: {value:?}"
        )));
    }
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    Ok(quoted)
}

/// Dockerfile for a model-serving image.
fn render_dockerfile(
    base_image: &str,
    image: &ImageName,
    model: &RegisteredModel,
) -> Result<String> {
    if base_image.trim().is_empty() || base_image.chars().any(char::is_whitespace) {
        return Err(Error::ImageBuild(format!("invalid base image: {base_image:?}")));
    }
    Ok(format!(
        "FROM {base_image}\n\
         WORKDIR /app\n\
         COPY {ARTIFACT_FILE} /app/{ARTIFACT_FILE}\n\
         ENV MODEL_PATH=/app/{ARTIFACT_FILE}\n\
         LABEL org.opencontainers.image.title=\"{repository}\" \\\n      \
         org.opencontainers.image.version=\"{tag}\" \\\n      \
         mlops.run-id={run_id}\n",
        repository = image.repository(),
        tag = image.tag(),
        run_id = label_value("run id", model.run_id())?,
    ))
}

async fn write_build_context(
    dir: &Path,
    dockerfile: &str,
    artifact: &[u8],
) -> std::io::Result<()> {
    tokio::fs::write(dir.join(ARTIFACT_FILE), artifact).await?;
    tokio::fs::write(dir.join("Dockerfile"), dockerfile).await
}

impl ImageBuilder for DockerCliContext {
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
        let dockerfile = render_dockerfile(&self.base_image, &image, model)?;
        let context = tempfile::Builder::new()
            .prefix("mlops-build-")
            .tempdir()
            .map_err(|e| Error::ImageBuild(format!("failed to create build context: {e}")))?;

        write_build_context(context.path(), &dockerfile, artifact)
            .await
            .map_err(|e| Error::ImageBuild(format!("failed to write build context: {e}")))?;

        let tag = image.to_string();
        let context_path = context.path().to_string_lossy().to_string();
        self.run_docker(&["build", "-t", &tag, &context_path], Error::ImageBuild)
            .await?;

        tracing::info!(image = %tag, size = artifact.len(), "built model image");
        Ok(())
    }

    async fn push_image(&self, experiment_name: &str, model: &RegisteredModel) -> Result<()> {
        let tag = self.image_name(experiment_name, model)?.to_string();
        self.run_docker(&["push", &tag], Error::ImagePush).await?;
        tracing::info!(image = %tag, "pushed model image");
        Ok(())
    }
}
