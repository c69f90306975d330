//! # mlops-deploy: Model Deployment Orchestration
//!
//! Coordinates the deployment of trained model artifacts: registers
//! deployment targets, moves a run's binary artifact into durable storage,
//! optionally packages it into a container image pushed to a registry, and
//! keeps an append-only history of which model version went where, by whom,
//! and at what address.
//!
//! ## Design Principles
//!
//! - **Record last**: a deployment record is written only after every side
//!   effect it describes has succeeded
//! - **Narrow seams**: the [`catalog::DeploymentCatalog`] depends on four small
//!   traits with in-memory and real implementations
//! - **Scoped buffers**: in-memory artifacts are released on every exit path
//! - **No hidden recovery**: errors surface unmodified, nothing is retried
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use mlops_deploy::artifact::FsArtifactStore;
//! use mlops_deploy::catalog::DeploymentCatalog;
//! use mlops_deploy::config::DeploymentConfig;
//! use mlops_deploy::image::DockerCliContext;
//! use mlops_deploy::repository::{
//!     ArtifactModelRepository, MemoryDeploymentRepository, MemoryExperimentRepository,
//! };
//!
//! # async fn example() -> mlops_deploy::Result<()> {
//! let config = DeploymentConfig::from_file("deploy.json").await?.apply_env_overrides()?;
//!
//! let catalog = DeploymentCatalog::new(
//!     MemoryDeploymentRepository::new(),
//!     ArtifactModelRepository::from_config(FsArtifactStore::new(&config.artifact_root), &config),
//!     MemoryExperimentRepository::new(),
//!     DockerCliContext::from_config(&config),
//! );
//! let targets = catalog.get_deployment_targets().await?;
//! println!("{} targets", targets.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod artifact;
pub mod buffer;
pub mod catalog;
pub mod config;
pub mod entities;
pub mod error;
pub mod image;
pub mod repository;
pub mod telemetry;

pub use error::{Error, Result};
