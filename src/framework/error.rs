//! Error taxonomy for the environment lifecycle

use std::time::Duration;
use thiserror::Error;

/// Boxed error for sources that do not share a concrete type
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used throughout the harness
pub type Result<T, E = FrameworkError> = std::result::Result<T, E>;

/// Errors raised while setting up or tearing down a test environment
#[derive(Error, Debug)]
pub enum FrameworkError {
    #[error("failed to load cluster configuration from {source_path}: {source}")]
    Config {
        source_path: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to build Kubernetes client: {0}")]
    Client(#[source] kube::Error),

    #[error("failed to create namespace with prefix {prefix}: {source}")]
    CreateNamespace {
        prefix: String,
        #[source]
        source: kube::Error,
    },

    #[error("server returned namespace without a name for prefix {0}")]
    UnnamedNamespace(String),

    #[error("failed to create workload {name} in {namespace}: {source}")]
    Workload {
        name: String,
        namespace: String,
        #[source]
        source: kube::Error,
    },

    #[error("failed to list workloads in {namespace}: {source}")]
    ListWorkloads {
        namespace: String,
        #[source]
        source: kube::Error,
    },

    #[error("readiness probe against {endpoint} failed: {source}")]
    Probe {
        endpoint: String,
        #[source]
        source: kube::Error,
    },

    #[error("custom resource not ready after {}s", .timeout.as_secs())]
    ReadinessTimeout { timeout: Duration },

    #[error("failed to open log stream for {workload}: {source}")]
    LogStream {
        workload: String,
        #[source]
        source: kube::Error,
    },

    #[error("failed to read logs of {workload}: {source}")]
    LogRead {
        workload: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write diagnostic report: {0}")]
    Report(#[source] std::io::Error),

    #[error("failed to look up namespace {namespace}: {source}")]
    NamespaceLookup {
        namespace: String,
        #[source]
        source: kube::Error,
    },

    #[error("failed to delete namespace {namespace}: {source}")]
    Deletion {
        namespace: String,
        #[source]
        source: kube::Error,
    },

    #[error("namespace {namespace} still present {}s after deletion", .timeout.as_secs())]
    DeletionTimeout { namespace: String, timeout: Duration },
}

impl FrameworkError {
    /// The custom resource never became available
    pub fn is_timeout(&self) -> bool {
        matches!(self, FrameworkError::ReadinessTimeout { .. })
    }

    /// Log retrieval failed during teardown
    pub fn is_diagnostics(&self) -> bool {
        matches!(
            self,
            FrameworkError::LogStream { .. }
                | FrameworkError::LogRead { .. }
                | FrameworkError::Report(_)
        )
    }
}
