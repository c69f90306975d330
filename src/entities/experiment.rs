//! Experiment - namespace for artifact and image naming

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Experiment groups the runs and registered models of one training effort.
///
/// Its name is used as the namespace for deployed artifact paths and
/// container image repositories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Experiment {
    experiment_id: Uuid,
    experiment_name: String,
    created_at: DateTime<Utc>,
}

impl Experiment {
    /// Create a new experiment with the given ID and name.
    ///
    /// # Arguments
    ///
    /// * `experiment_id` - Unique identifier for the experiment
    /// * `experiment_name` - Human-readable name, also the deployment namespace
    #[must_use]
    pub fn new(experiment_id: Uuid, experiment_name: impl Into<String>) -> Self {
        Self {
            experiment_id,
            experiment_name: experiment_name.into(),
            created_at: Utc::now(),
        }
    }

    /// Get the experiment ID.
    #[must_use]
    pub const fn experiment_id(&self) -> Uuid {
        self.experiment_id
    }

    /// Get the experiment name.
    #[must_use]
    pub fn experiment_name(&self) -> &str {
        &self.experiment_name
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Override the creation timestamp (useful for deserialization/testing).
    #[must_use]
    pub const fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_experiment_new() {
        let id = Uuid::new_v4();
        let experiment = Experiment::new(id, "fraud-detection");
        assert_eq!(experiment.experiment_id(), id);
        assert_eq!(experiment.experiment_name(), "fraud-detection");
    }

    #[test]
    fn test_experiment_with_created_at() {
        let ts = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let experiment = Experiment::new(Uuid::new_v4(), "x").with_created_at(ts);
        assert_eq!(experiment.created_at(), ts);
    }
}
