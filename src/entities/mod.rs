//! Deployment entities
//!
//! ```text
//! Experiment (1) ──< RegisteredModel (N)
//!                         │
//! DeploymentTarget (1) ──<┴── Deployment (N) [append-only]
//! ```
//!
//! Experiments and registered models are owned by the metadata store and are
//! read-only here. Deployment targets are created through the catalog and
//! never mutated. Deployments form an append-only audit log.
//!
//! ## Usage
//!
//! ```rust
//! use mlops_deploy::entities::{Deployment, DeploymentTarget, Experiment, RegisteredModel};
//! use uuid::Uuid;
//!
//! let experiment = Experiment::new(Uuid::new_v4(), "churn-classifier");
//! let model = RegisteredModel::new(experiment.experiment_id(), "run-001", 1);
//! let target = DeploymentTarget::new("staging", false);
//!
//! let deployment = Deployment::new(&target, &model, "alice", "https://store/run-001");
//! assert_eq!(deployment.deployment_target_id(), target.deployment_target_id());
//! ```

mod deployment;
mod deployment_target;
mod experiment;
mod registered_model;

pub use deployment::Deployment;
pub use deployment_target::DeploymentTarget;
pub use experiment::Experiment;
pub use registered_model::{RegisteredModel, RegisteredModelBuilder};
