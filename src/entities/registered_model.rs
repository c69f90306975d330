//! Registered Model - a versioned run output promoted for deployment

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registered Model points at the run whose artifact is deployed.
///
/// The run ID keys the binary artifact in the model store, the experiment ID
/// resolves the naming namespace and the version tags container images.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisteredModel {
    registered_model_id: Uuid,
    experiment_id: Uuid,
    run_id: String,
    version: u32,
    registered_by: Option<String>,
    registered_at: DateTime<Utc>,
}

impl RegisteredModel {
    /// Create a new registered model for a run.
    ///
    /// # Arguments
    ///
    /// * `experiment_id` - ID of the owning experiment
    /// * `run_id` - ID of the run that produced the artifact
    /// * `version` - Model version, used as the image tag
    #[must_use]
    pub fn new(experiment_id: Uuid, run_id: impl Into<String>, version: u32) -> Self {
        Self {
            registered_model_id: Uuid::new_v4(),
            experiment_id,
            run_id: run_id.into(),
            version,
            registered_by: None,
            registered_at: Utc::now(),
        }
    }

    /// Create a builder for constructing a registered model with optional fields.
    #[must_use]
    pub fn builder(experiment_id: Uuid, run_id: impl Into<String>) -> RegisteredModelBuilder {
        RegisteredModelBuilder::new(experiment_id, run_id)
    }

    /// Get the registered model ID.
    #[must_use]
    pub const fn registered_model_id(&self) -> Uuid {
        self.registered_model_id
    }

    /// Get the owning experiment ID.
    #[must_use]
    pub const fn experiment_id(&self) -> Uuid {
        self.experiment_id
    }

    /// Get the run ID keying the model artifact.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Get the model version.
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Get who registered the model, if recorded.
    #[must_use]
    pub fn registered_by(&self) -> Option<&str> {
        self.registered_by.as_deref()
    }

    /// Get the registration timestamp.
    #[must_use]
    pub const fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }
}

/// Builder for `RegisteredModel`.
#[derive(Debug)]
pub struct RegisteredModelBuilder {
    registered_model_id: Uuid,
    experiment_id: Uuid,
    run_id: String,
    version: u32,
    registered_by: Option<String>,
    registered_at: DateTime<Utc>,
}

impl RegisteredModelBuilder {
    /// Create a new builder with required fields. Version defaults to 1.
    #[must_use]
    pub fn new(experiment_id: Uuid, run_id: impl Into<String>) -> Self {
        Self {
            registered_model_id: Uuid::new_v4(),
            experiment_id,
            run_id: run_id.into(),
            version: 1,
            registered_by: None,
            registered_at: Utc::now(),
        }
    }

    /// Set a known registered model ID.
    #[must_use]
    pub const fn registered_model_id(mut self, id: Uuid) -> Self {
        self.registered_model_id = id;
        self
    }

    /// Set the model version.
    #[must_use]
    pub const fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Set who registered the model.
    #[must_use]
    pub fn registered_by(mut self, registered_by: impl Into<String>) -> Self {
        self.registered_by = Some(registered_by.into());
        self
    }

    /// Set a custom registration timestamp.
    #[must_use]
    pub const fn registered_at(mut self, registered_at: DateTime<Utc>) -> Self {
        self.registered_at = registered_at;
        self
    }

    /// Build the `RegisteredModel`.
    #[must_use]
    pub fn build(self) -> RegisteredModel {
        RegisteredModel {
            registered_model_id: self.registered_model_id,
            experiment_id: self.experiment_id,
            run_id: self.run_id,
            version: self.version,
            registered_by: self.registered_by,
            registered_at: self.registered_at,
        }
    }
}
