//! Orchestration capability interface
//!
//! Everything the lifecycle needs from the cluster, expressed as a trait so
//! tests can substitute an in-memory platform.

use async_trait::async_trait;
use futures::io::AsyncWrite;
use serde::{Deserialize, Serialize};

use super::workload::{WorkloadSpec, WorkloadSummary};
use crate::framework::Result;

/// Destination for streamed log bytes
pub type LogSink<'a> = &'a mut (dyn AsyncWrite + Send + Unpin);

/// Identity of the custom resource type the controller registers
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomResourceSpec {
    pub group: String,
    pub version: String,
    pub kind: String,
    pub plural: String,
}

impl Default for CustomResourceSpec {
    fn default() -> Self {
        Self {
            group: "coreos.com".to_string(),
            version: "v1".to_string(),
            kind: "EtcdCluster".to_string(),
            plural: "etcdclusters".to_string(),
        }
    }
}

impl CustomResourceSpec {
    /// Namespaced collection endpoint the readiness probe hits
    pub fn endpoint(&self, host: &str, namespace: &str) -> String {
        format!(
            "{}/apis/{}/{}/namespaces/{}/{}",
            host.trim_end_matches('/'),
            self.group,
            self.version,
            namespace,
            self.plural
        )
    }
}

/// Cluster operations used by setup and teardown
#[async_trait]
pub trait Platform: Send + Sync {
    /// API server address the client talks to
    fn host(&self) -> &str;

    /// Create a namespace from `prefix`; returns the server-assigned name
    async fn create_namespace(&self, prefix: &str) -> Result<String>;

    async fn delete_namespace(&self, name: &str) -> Result<()>;

    async fn namespace_exists(&self, name: &str) -> Result<bool>;

    async fn create_workload(&self, namespace: &str, spec: &WorkloadSpec) -> Result<()>;

    async fn list_workloads(&self, namespace: &str) -> Result<Vec<WorkloadSummary>>;

    /// Stream the last `tail_lines` lines of a workload's log into `out`,
    /// byte for byte; returns the number of bytes copied
    async fn copy_logs(
        &self,
        namespace: &str,
        workload: &str,
        tail_lines: i64,
        out: LogSink<'_>,
    ) -> Result<u64>;

    /// `Ok(true)` once the custom resource answers, `Ok(false)` while it is
    /// still unknown to the API server
    async fn probe_readiness(
        &self,
        host: &str,
        namespace: &str,
        resource: &CustomResourceSpec,
    ) -> Result<bool>;
}
