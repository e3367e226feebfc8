//! Kubernetes client wrapper
//!
//! Implements [`Platform`] on top of kube-rs.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Namespace, Pod};
use kube::{
    api::{Api, DeleteParams, ListParams, LogParams, PostParams},
    config::{KubeConfigOptions, Kubeconfig},
    core::{ApiResource, DynamicObject, GroupVersionKind, ObjectMeta},
    Client, Config,
};
use tracing::{debug, info};

use super::platform::{CustomResourceSpec, LogSink, Platform};
use super::workload::{WorkloadSpec, WorkloadSummary};
use crate::framework::{copy_stream, FrameworkError, Result};

/// Kubernetes client wrapper
#[derive(Clone)]
pub struct K8sClient {
    client: Client,
    host: String,
}

impl K8sClient {
    /// Build a client from a kubeconfig path
    ///
    /// An empty path falls back to the inferred configuration (in-cluster
    /// service account or the default kubeconfig).
    pub async fn from_kubeconfig(path: &str) -> Result<Self> {
        let config = if path.is_empty() {
            Config::infer()
                .await
                .map_err(|e| FrameworkError::Config {
                    source_path: "<inferred>".to_string(),
                    source: Box::new(e),
                })?
        } else {
            let kubeconfig = Kubeconfig::read_from(path).map_err(|e| FrameworkError::Config {
                source_path: path.to_string(),
                source: Box::new(e),
            })?;
            Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .map_err(|e| FrameworkError::Config {
                    source_path: path.to_string(),
                    source: Box::new(e),
                })?
        };

        Self::with_config(config)
    }

    /// Create client with custom config
    pub fn with_config(config: Config) -> Result<Self> {
        let host = config.cluster_url.to_string();
        let client = Client::try_from(config).map_err(FrameworkError::Client)?;
        info!("Connected to cluster at {}", host);

        Ok(Self::from_client(client, host))
    }

    /// Wrap an existing kube client bound to `host`
    pub fn from_client(client: Client, host: impl Into<String>) -> Self {
        Self {
            client,
            host: host.into(),
        }
    }

    fn namespaces(&self) -> Api<Namespace> {
        Api::all(self.client.clone())
    }

    fn pods(&self, namespace: &str) -> Api<Pod> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl Platform for K8sClient {
    fn host(&self) -> &str {
        &self.host
    }

    async fn create_namespace(&self, prefix: &str) -> Result<String> {
        let namespace = Namespace {
            metadata: ObjectMeta {
                generate_name: Some(prefix.to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        let created = self
            .namespaces()
            .create(&PostParams::default(), &namespace)
            .await
            .map_err(|source| FrameworkError::CreateNamespace {
                prefix: prefix.to_string(),
                source,
            })?;

        created
            .metadata
            .name
            .ok_or_else(|| FrameworkError::UnnamedNamespace(prefix.to_string()))
    }

    async fn delete_namespace(&self, name: &str) -> Result<()> {
        self.namespaces()
            .delete(name, &DeleteParams::default())
            .await
            .map_err(|source| FrameworkError::Deletion {
                namespace: name.to_string(),
                source,
            })?;
        Ok(())
    }

    async fn namespace_exists(&self, name: &str) -> Result<bool> {
        match self.namespaces().get(name).await {
            Ok(_) => Ok(true),
            Err(kube::Error::Api(e)) if e.code == 404 => Ok(false),
            Err(source) => Err(FrameworkError::NamespaceLookup {
                namespace: name.to_string(),
                source,
            }),
        }
    }

    async fn create_workload(&self, namespace: &str, spec: &WorkloadSpec) -> Result<()> {
        self.pods(namespace)
            .create(&PostParams::default(), &spec.to_pod())
            .await
            .map_err(|source| FrameworkError::Workload {
                name: spec.name.clone(),
                namespace: namespace.to_string(),
                source,
            })?;
        Ok(())
    }

    async fn list_workloads(&self, namespace: &str) -> Result<Vec<WorkloadSummary>> {
        let pods = self
            .pods(namespace)
            .list(&ListParams::default())
            .await
            .map_err(|source| FrameworkError::ListWorkloads {
                namespace: namespace.to_string(),
                source,
            })?;

        Ok(pods.items.iter().map(WorkloadSummary::from_pod).collect())
    }

    async fn copy_logs(
        &self,
        namespace: &str,
        workload: &str,
        tail_lines: i64,
        out: LogSink<'_>,
    ) -> Result<u64> {
        let params = LogParams {
            tail_lines: Some(tail_lines),
            ..LogParams::default()
        };

        let pods = self.pods(namespace);
        let reader = pods
            .log_stream(workload, &params)
            .await
            .map_err(|source| FrameworkError::LogStream {
                workload: workload.to_string(),
                source,
            })?;

        copy_stream(reader, out, workload).await
    }

    async fn probe_readiness(
        &self,
        host: &str,
        namespace: &str,
        resource: &CustomResourceSpec,
    ) -> Result<bool> {
        let gvk = GroupVersionKind::gvk(&resource.group, &resource.version, &resource.kind);
        let api_resource = ApiResource::from_gvk_with_plural(&gvk, &resource.plural);
        let api: Api<DynamicObject> =
            Api::namespaced_with(self.client.clone(), namespace, &api_resource);

        match api.list(&ListParams::default().limit(1)).await {
            Ok(_) => Ok(true),
            Err(kube::Error::Api(e)) if e.code == 404 => {
                debug!("{} not registered yet", resource.plural);
                Ok(false)
            }
            Err(source) => Err(FrameworkError::Probe {
                endpoint: resource.endpoint(host, namespace),
                source,
            }),
        }
    }
}
