//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;

use super::FrameworkConfig;

/// Environment variable prefix
const ENV_PREFIX: &str = "CONTROLLER_E2E";

/// Overrides read from `CONTROLLER_E2E_*` variables
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnvConfig {
    /// Kubeconfig from CONTROLLER_E2E_KUBECONFIG, else KUBECONFIG
    pub kubeconfig: Option<String>,
    /// Image from CONTROLLER_E2E_CONTROLLER_IMAGE
    pub controller_image: Option<String>,
    /// Prefix from CONTROLLER_E2E_NAMESPACE_PREFIX
    pub namespace_prefix: Option<String>,
    /// Interval from CONTROLLER_E2E_POLL_INTERVAL
    pub poll_interval_secs: Option<u64>,
    /// Deadline from CONTROLLER_E2E_READY_TIMEOUT
    pub ready_timeout_secs: Option<u64>,
    /// Deletion wait from CONTROLLER_E2E_WAIT_DELETION
    pub wait_for_deletion: Option<bool>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(&format!("{ENV_PREFIX}_{name}"));

        Self {
            kubeconfig: get("KUBECONFIG").or_else(|| lookup("KUBECONFIG")),
            controller_image: get("CONTROLLER_IMAGE"),
            namespace_prefix: get("NAMESPACE_PREFIX"),
            poll_interval_secs: get("POLL_INTERVAL").and_then(|v| v.parse().ok()),
            ready_timeout_secs: get("READY_TIMEOUT").and_then(|v| v.parse().ok()),
            wait_for_deletion: get("WAIT_DELETION").map(|v| parse_bool(&v)),
        }
    }

    /// Overwrite every field of `config` that is set here
    pub fn apply(&self, config: &mut FrameworkConfig) {
        if let Some(v) = &self.kubeconfig {
            config.kubeconfig = v.clone();
        }
        if let Some(v) = &self.controller_image {
            config.controller_image = v.clone();
        }
        if let Some(v) = &self.namespace_prefix {
            config.namespace_prefix = v.clone();
        }
        if let Some(v) = self.poll_interval_secs {
            config.poll_interval_secs = v;
        }
        if let Some(v) = self.ready_timeout_secs {
            config.ready_timeout_secs = v;
        }
        if let Some(v) = self.wait_for_deletion {
            config.wait_for_deletion = v;
        }
    }
}

fn parse_bool(v: &str) -> bool {
    matches!(
        v.to_lowercase().as_str(),
        "1" | "true" | "yes" | "on" | "enabled"
    )
}
