//! # photon-core
//!
//! Core runtime for Photon control-plane clients.
//!
//! This crate owns the pieces every resource API shares: the HTTP transport, the
//! error translator, list pagination, and the poller that waits for asynchronous
//! tasks to finish.
//!
//! ## Modules
//!
//! - [`error`] - Error types and API error translation
//! - [`task`] - Task, step and task state records
//! - [`page`] - List envelope with `nextPageLink`
//! - [`config`] - Client options loaded from files or built in code
//! - [`client`] - HTTP transport, resource executor and poll timing
//! - [`credentials`] - Bearer token providers
//! - [`poller`] - Waiting for tasks to reach a terminal state

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod page;
pub mod poller;
pub mod task;

// Re-export commonly used types
pub use client::{PollPolicy, RestClient, RestClientBuilder};
pub use config::ClientOptions;
pub use credentials::{CredentialProvider, NoCredentials, StaticToken};
pub use error::{translate_error, ApiError, Error, Result};
pub use page::Page;
pub use poller::{PollOptions, PollState, TaskPoller, TaskSource};
pub use task::{Entity, Step, Task, TaskError, TaskState};

// Re-exported so callers can cancel waits without a direct dependency
pub use tokio_util::sync::CancellationToken;
