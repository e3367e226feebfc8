//! Configuration module
//!
//! Handles loading and layering harness configuration: defaults, then a
//! YAML/JSON file, then environment variables, then command-line flags.

mod env;

pub use env::EnvConfig;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::deploy::{Provisioner, ReadinessPoller};
use crate::framework::DEFAULT_TAIL_LINES;
use crate::k8s::{CustomResourceSpec, DEFAULT_NAMESPACE_ENV, DEFAULT_WORKLOAD_NAME};
use crate::utils::Clock;

/// Prefix for generated namespace names
pub const DEFAULT_NAMESPACE_PREFIX: &str = "e2e-test-";

/// Harness configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameworkConfig {
    /// Path to kubeconfig; empty means infer
    pub kubeconfig: String,

    /// Controller image reference
    pub controller_image: String,

    /// Namespace name prefix
    pub namespace_prefix: String,

    /// Name of the controller pod and container
    pub workload_name: String,

    /// Env var carrying the pod namespace into the controller
    pub namespace_env: String,

    /// Custom resource type the controller registers
    pub custom_resource: CustomResourceSpec,

    /// Seconds between readiness probes
    pub poll_interval_secs: u64,

    /// Readiness deadline in seconds
    pub ready_timeout_secs: u64,

    /// Log lines captured at teardown
    pub log_tail_lines: i64,

    /// Poll until the namespace is gone after deleting it
    pub wait_for_deletion: bool,
}

impl Default for FrameworkConfig {
    fn default() -> Self {
        Self {
            kubeconfig: String::new(),
            controller_image: String::new(),
            namespace_prefix: DEFAULT_NAMESPACE_PREFIX.to_string(),
            workload_name: DEFAULT_WORKLOAD_NAME.to_string(),
            namespace_env: DEFAULT_NAMESPACE_ENV.to_string(),
            custom_resource: CustomResourceSpec::default(),
            poll_interval_secs: 5,
            ready_timeout_secs: 90,
            log_tail_lines: DEFAULT_TAIL_LINES,
            wait_for_deletion: false,
        }
    }
}

impl FrameworkConfig {
    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read config file")?;

        let config: Self = if is_yaml(path.as_ref()) {
            serde_yaml::from_str(&content).context("Failed to parse YAML config")?
        } else {
            serde_json::from_str(&content).context("Failed to parse JSON config")?
        };

        Ok(config)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_timeout_secs)
    }

    /// Poller with this configuration's interval and deadline
    pub fn poller<'a, C: Clock + ?Sized>(&self, clock: &'a C) -> ReadinessPoller<'a, C> {
        ReadinessPoller::new(clock)
            .interval(self.poll_interval())
            .timeout(self.ready_timeout())
    }

    pub fn provisioner<'a, C: Clock + ?Sized>(
        &self,
        poller: ReadinessPoller<'a, C>,
    ) -> Provisioner<'a, C> {
        Provisioner::new(poller)
            .workload_name(&self.workload_name)
            .namespace_env(&self.namespace_env)
            .resource(self.custom_resource.clone())
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}
