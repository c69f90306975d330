//! Deployment - append-only record of one deployment event

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DeploymentTarget, RegisteredModel};

/// Deployment records which model went to which target, by whom and where
/// it can be reached.
///
/// The `deployment_uri` may be empty when the target address is not resolved
/// (container deployments without a cluster deployer).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Deployment {
    deployment_id: Uuid,
    deployment_target_id: Uuid,
    registered_model_id: Uuid,
    experiment_id: Uuid,
    deployed_by: String,
    deployment_uri: String,
    deployed_at: DateTime<Utc>,
}

impl Deployment {
    /// Create a new deployment record.
    ///
    /// # Arguments
    ///
    /// * `target` - Target the model was deployed to
    /// * `model` - Registered model that was deployed
    /// * `deployed_by` - Human or system identity that triggered the deployment
    /// * `deployment_uri` - Resolvable address of the deployed model (may be empty)
    #[must_use]
    pub fn new(
        target: &DeploymentTarget,
        model: &RegisteredModel,
        deployed_by: impl Into<String>,
        deployment_uri: impl Into<String>,
    ) -> Self {
        Self {
            deployment_id: Uuid::new_v4(),
            deployment_target_id: target.deployment_target_id(),
            registered_model_id: model.registered_model_id(),
            experiment_id: model.experiment_id(),
            deployed_by: deployed_by.into(),
            deployment_uri: deployment_uri.into(),
            deployed_at: Utc::now(),
        }
    }

    /// Get the deployment ID.
    #[must_use]
    pub const fn deployment_id(&self) -> Uuid {
        self.deployment_id
    }

    /// Get the target ID.
    #[must_use]
    pub const fn deployment_target_id(&self) -> Uuid {
        self.deployment_target_id
    }

    /// Get the registered model ID.
    #[must_use]
    pub const fn registered_model_id(&self) -> Uuid {
        self.registered_model_id
    }

    /// Get the experiment ID of the deployed model.
    #[must_use]
    pub const fn experiment_id(&self) -> Uuid {
        self.experiment_id
    }

    /// Get who triggered the deployment.
    #[must_use]
    pub fn deployed_by(&self) -> &str {
        &self.deployed_by
    }

    /// Get the deployment URI.
    #[must_use]
    pub fn deployment_uri(&self) -> &str {
        &self.deployment_uri
    }

    /// Get the deployment timestamp.
    #[must_use]
    pub const fn deployed_at(&self) -> DateTime<Utc> {
        self.deployed_at
    }
}
