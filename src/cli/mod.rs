//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::Parser;
use std::path::PathBuf;

use crate::config::FrameworkConfig;

/// Ephemeral Kubernetes environment for controller e2e tests
#[derive(Parser, Debug)]
#[command(name = "controller-e2e")]
#[command(version)]
#[command(about = "Provision a throwaway namespace, run the controller in it, then tear it down")]
#[command(long_about = None)]
pub struct Args {
    /// kube config path, e.g. $HOME/.kube/config
    #[arg(long)]
    pub kubeconfig: Option<String>,

    /// controller image, e.g. quay.io/coreos/kube-etcd-controller
    #[arg(long = "controller-image")]
    pub controller_image: Option<String>,

    /// Configuration file (YAML or JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Wait until the namespace is gone before finishing teardown
    #[arg(long)]
    pub wait_deletion: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Flags override everything already in `config`
    pub fn apply(&self, config: &mut FrameworkConfig) {
        if let Some(kubeconfig) = &self.kubeconfig {
            config.kubeconfig = kubeconfig.clone();
        }
        if let Some(image) = &self.controller_image {
            config.controller_image = image.clone();
        }
        if self.wait_deletion {
            config.wait_for_deletion = true;
        }
    }
}
