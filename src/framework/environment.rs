//! Ephemeral test environment lifecycle
//!
//! [`Environment::setup`] yields a handle only once the namespace exists, the
//! controller is running and its custom resource type answers.
//! [`Environment::teardown`] consumes the handle; on failure the handle is
//! handed back inside [`TeardownError`] so deletion can be retried.

use std::fmt;
use std::io;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use super::diagnostics::{collect_logs, write_report};
use super::error::{FrameworkError, Result};
use crate::config::FrameworkConfig;
use crate::k8s::{K8sClient, Platform, WorkloadSummary};
use crate::utils::{Clock, Timer, TokioClock};

/// One live ephemeral environment
pub struct Environment<P: Platform = K8sClient> {
    platform: P,
    master_host: String,
    namespace: String,
    clock: Arc<dyn Clock>,
    config: FrameworkConfig,
}

impl Environment<K8sClient> {
    /// Build a client from `config.kubeconfig` and provision an environment
    pub async fn setup(config: &FrameworkConfig) -> Result<Self> {
        let platform = K8sClient::from_kubeconfig(&config.kubeconfig).await?;
        Self::setup_with(platform, Arc::new(TokioClock), config).await
    }
}

impl<P: Platform> Environment<P> {
    /// Provision an environment on an existing platform handle
    pub async fn setup_with(
        platform: P,
        clock: Arc<dyn Clock>,
        config: &FrameworkConfig,
    ) -> Result<Self> {
        let timer = Timer::start(&*clock, "setup");
        let master_host = platform.host().to_string();

        let namespace = platform.create_namespace(&config.namespace_prefix).await?;
        info!("Created namespace {} on {}", namespace, master_host);

        let provisioner = config.provisioner(config.poller(&*clock));
        if let Err(e) = provisioner
            .provision(&platform, &namespace, &config.controller_image)
            .await
        {
            warn!("Namespace {} left behind after failed setup", namespace);
            return Err(e);
        }

        let elapsed = timer.stop(&*clock);
        info!("e2e setup successfully ({}s)", elapsed.as_secs());

        Ok(Self {
            platform,
            master_host,
            namespace,
            clock,
            config: config.clone(),
        })
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn master_host(&self) -> &str {
        &self.master_host
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn config(&self) -> &FrameworkConfig {
        &self.config
    }

    /// Workloads currently present in the environment's namespace
    pub async fn workloads(&self) -> Result<Vec<WorkloadSummary>> {
        self.platform.list_workloads(&self.namespace).await
    }

    /// Capture controller logs to stdout, then delete the namespace
    pub async fn teardown(self) -> std::result::Result<(), TeardownError<P>> {
        self.teardown_to(&mut io::stdout()).await
    }

    /// Same as [`Environment::teardown`], writing the log report to `out`
    pub async fn teardown_to<W: io::Write>(
        self,
        out: &mut W,
    ) -> std::result::Result<(), TeardownError<P>> {
        match self.try_teardown(out).await {
            Ok(()) => {
                info!("e2e teardown successfully");
                Ok(())
            }
            Err(source) => {
                error!("Teardown of {} failed: {}", self.namespace, source);
                Err(TeardownError {
                    environment: self,
                    source,
                })
            }
        }
    }

    async fn try_teardown<W: io::Write>(&self, out: &mut W) -> Result<()> {
        let workload = &self.config.workload_name;
        let logs = collect_logs(
            &self.platform,
            &self.namespace,
            workload,
            self.config.log_tail_lines,
        )
        .await?;
        write_report(out, workload, &logs)?;

        self.platform.delete_namespace(&self.namespace).await?;
        info!("Deleted namespace {}", self.namespace);

        if self.config.wait_for_deletion {
            self.config
                .poller(&*self.clock)
                .wait_until_deleted(&self.platform, &self.namespace)
                .await?;
        } else {
            warn!(
                "Namespace {} deletion requested; removal not verified",
                self.namespace
            );
        }

        Ok(())
    }
}

impl<P: Platform> fmt::Debug for Environment<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("master_host", &self.master_host)
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

/// Failed teardown; still owns the environment
#[derive(Error)]
#[error("teardown of namespace {} failed: {source}", .environment.namespace)]
pub struct TeardownError<P: Platform = K8sClient> {
    environment: Environment<P>,
    #[source]
    source: FrameworkError,
}

impl<P: Platform> TeardownError<P> {
    pub fn error(&self) -> &FrameworkError {
        &self.source
    }

    /// Recover the environment, e.g. to retry teardown
    pub fn into_environment(self) -> Environment<P> {
        self.environment
    }

    pub fn into_parts(self) -> (Environment<P>, FrameworkError) {
        (self.environment, self.source)
    }
}

impl<P: Platform> fmt::Debug for TeardownError<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TeardownError")
            .field("environment", &self.environment)
            .field("source", &self.source)
            .finish()
    }
}
