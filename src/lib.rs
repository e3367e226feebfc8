//! Controller e2e harness
//!
//! Provisions an isolated namespace in a Kubernetes cluster, deploys the
//! controller under test into it, waits for the custom resource type the
//! controller registers, and tears everything down afterwards while
//! capturing the controller's logs.
//!
//! ## Usage
//!
//! ```text
//! let env = Environment::setup(&config).await?;
//! // ... run tests against env.namespace() ...
//! env.teardown().await?;
//! ```

pub mod cli;
pub mod config;
pub mod deploy;
pub mod framework;
pub mod k8s;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use config::FrameworkConfig;
pub use framework::{Environment, FrameworkError, TeardownError};
