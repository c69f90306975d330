//! Deployment Target - an environment models are deployed to

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named environment such as "staging" or "production".
///
/// Targets are immutable once created. Names are not unique.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeploymentTarget {
    deployment_target_id: Uuid,
    name: String,
    is_production: bool,
    created_at: DateTime<Utc>,
}

impl DeploymentTarget {
    /// Create a new deployment target with a fresh ID.
    #[must_use]
    pub fn new(name: impl Into<String>, is_production: bool) -> Self {
        Self {
            deployment_target_id: Uuid::new_v4(),
            name: name.into(),
            is_production,
            created_at: Utc::now(),
        }
    }

    /// Get the deployment target ID.
    #[must_use]
    pub const fn deployment_target_id(&self) -> Uuid {
        self.deployment_target_id
    }

    /// Get the target name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this target serves production traffic.
    #[must_use]
    pub const fn is_production(&self) -> bool {
        self.is_production
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
