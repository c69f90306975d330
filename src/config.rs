//! Deployment configuration.
//!
//! Loaded from JSON, overridable from the environment:
//!
//! | Variable                   | Field                |
//! |----------------------------|----------------------|
//! | `MLOPS_REGISTRY`           | `registry`           |
//! | `MLOPS_ARTIFACT_ROOT`      | `artifact_root`      |
//! | `MLOPS_DOCKER_BINARY`      | `docker_binary`      |
//! | `MLOPS_MAX_ARTIFACT_BYTES` | `max_artifact_bytes` |
//!
//! ```rust
//! use mlops_deploy::config::DeploymentConfig;
//!
//! let json = r#"{"registry": "registry.example.com/ml"}"#;
//! let config = DeploymentConfig::from_json_str(json).unwrap();
//! assert_eq!(config.registry, "registry.example.com/ml");
//! assert_eq!(config.model_container, "model-repository");
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Settings shared by the artifact store, model repository and image builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentConfig {
    /// Registry host (and optional namespace) images are pushed to.
    pub registry: String,
    /// Container holding uploaded run artifacts.
    pub model_container: String,
    /// Container holding deployed artifact copies.
    pub deployment_container: String,
    /// Root directory of the filesystem artifact store.
    pub artifact_root: PathBuf,
    /// Docker CLI executable.
    pub docker_binary: String,
    /// Base image of generated model-serving images.
    pub base_image: String,
    /// Upper bound for an artifact held in memory during image builds.
    pub max_artifact_bytes: Option<usize>,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            registry: "localhost:5000".to_string(),
            model_container: "model-repository".to_string(),
            deployment_container: "deployment".to_string(),
            artifact_root: PathBuf::from("./artifacts"),
            docker_binary: "docker".to_string(),
            base_image: "debian:bookworm-slim".to_string(),
            max_artifact_bytes: None,
        }
    }
}

impl DeploymentConfig {
    /// Create a builder starting from defaults.
    #[must_use]
    pub fn builder() -> DeploymentConfigBuilder {
        DeploymentConfigBuilder::default()
    }

    /// Parse and validate a JSON document. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` for malformed JSON and `Error::InvalidConfig`
    /// if validation fails.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if the file cannot be read, otherwise
    /// the errors of [`Self::from_json_str`].
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::InvalidConfig(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&json)
    }

    /// Apply `MLOPS_*` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if `MLOPS_MAX_ARTIFACT_BYTES` is not a number.
    pub fn apply_env_overrides(self) -> Result<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`Self::apply_env_overrides`].
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(registry) = lookup("MLOPS_REGISTRY") {
            self.registry = registry;
        }
        if let Some(root) = lookup("MLOPS_ARTIFACT_ROOT") {
            self.artifact_root = PathBuf::from(root);
        }
        if let Some(docker) = lookup("MLOPS_DOCKER_BINARY") {
            self.docker_binary = docker;
        }
        if let Some(max) = lookup("MLOPS_MAX_ARTIFACT_BYTES") {
            let max = max.trim().parse::<usize>().map_err(|e| {
                Error::InvalidConfig(format!("MLOPS_MAX_ARTIFACT_BYTES '{max}': {e}"))
            })?;
            self.max_artifact_bytes = Some(max);
        }
        self.validate()?;
        Ok(self)
    }

    /// Check that every required field is usable.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("registry", &self.registry),
            ("model_container", &self.model_container),
            ("deployment_container", &self.deployment_container),
            ("docker_binary", &self.docker_binary),
            ("base_image", &self.base_image),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(Error::InvalidConfig(format!("{field} must not be empty")));
            }
        }
        if self.model_container == self.deployment_container {
            return Err(Error::InvalidConfig(
                "model_container and deployment_container must differ".to_string(),
            ));
        }
        if self.max_artifact_bytes == Some(0) {
            return Err(Error::InvalidConfig(
                "max_artifact_bytes must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for `DeploymentConfig`.
#[derive(Debug, Default)]
pub struct DeploymentConfigBuilder {
    config: DeploymentConfig,
}

impl DeploymentConfigBuilder {
    /// Set the image registry.
    #[must_use]
    pub fn registry(mut self, registry: impl Into<String>) -> Self {
        self.config.registry = registry.into();
        self
    }

    /// Set the model and deployment container names.
    #[must_use]
    pub fn containers(
        mut self,
        model_container: impl Into<String>,
        deployment_container: impl Into<String>,
    ) -> Self {
        self.config.model_container = model_container.into();
        self.config.deployment_container = deployment_container.into();
        self
    }

    /// Set the filesystem artifact root.
    #[must_use]
    pub fn artifact_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.artifact_root = root.into();
        self
    }

    /// Set the docker executable.
    #[must_use]
    pub fn docker_binary(mut self, binary: impl Into<String>) -> Self {
        self.config.docker_binary = binary.into();
        self
    }

    /// Set the base image for generated images.
    #[must_use]
    pub fn base_image(mut self, image: impl Into<String>) -> Self {
        self.config.base_image = image.into();
        self
    }

    /// Cap in-memory artifact size.
    #[must_use]
    pub const fn max_artifact_bytes(mut self, max: usize) -> Self {
        self.config.max_artifact_bytes = Some(max);
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if validation fails.
    pub fn build(self) -> Result<DeploymentConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
