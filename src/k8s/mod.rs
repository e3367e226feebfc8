//! Kubernetes API client module
//!
//! Provides the cluster operations used to provision and tear down test
//! environments.

mod client;
mod platform;
mod workload;

pub use client::K8sClient;
pub use platform::{CustomResourceSpec, LogSink, Platform};
pub use workload::{WorkloadSpec, WorkloadSummary, DEFAULT_NAMESPACE_ENV, DEFAULT_WORKLOAD_NAME};
