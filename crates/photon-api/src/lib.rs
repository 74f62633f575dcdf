//! Photon control-plane client.
//!
//! Typed wrappers over the Photon REST API. Every mutating call returns a
//! [`Task`]; [`TasksApi::wait`] blocks until the task reaches a terminal state.
//!
//! ```no_run
//! # async fn demo() -> photon_api::Result<()> {
//! use photon_api::{DeploymentCreateSpec, PhotonClient};
//!
//! let client = PhotonClient::builder("https://10.146.1.0:9000")?
//!     .with_token("access-token")
//!     .build()?;
//!
//! let spec = DeploymentCreateSpec {
//!     image_datastores: vec!["datastore1".into()],
//!     ..DeploymentCreateSpec::default()
//! };
//! let task = client.deployments().create(&spec).await?;
//! let task = client.tasks().wait(&task.id).await?;
//! println!("deployment {} ready", task.entity_id().unwrap_or_default());
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

pub mod client;
pub mod deployments;
pub mod hosts;
pub mod models;
pub mod routers;
pub mod services;
pub mod tasks;

pub use client::{PhotonClient, PhotonClientBuilder};
pub use deployments::DeploymentsApi;
pub use hosts::InfraHostsApi;
pub use models::{
    AuthInfo, Deployment, DeploymentCreateSpec, Host, HostCreateSpec, IpRange,
    NsxCniConfigurationSpec, NsxConfigurationSpec, Router, RouterSetNameOperation,
    RouterUpdateSpec, Service, ServiceChangeVersionOperation, ServiceConfigurationSpec,
    ServiceResizeOperation, TaskListParams, Vm,
};
pub use photon_core::{
    ApiError, CancellationToken, ClientOptions, Error, PollOptions, PollState, Task, TaskError,
    TaskState,
};
pub use routers::RoutersApi;
pub use services::ServicesApi;
pub use tasks::TasksApi;

/// Convenient result alias that reuses the shared Photon error type.
pub type Result<T> = photon_core::Result<T>;
