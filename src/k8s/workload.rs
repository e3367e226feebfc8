//! Controller workload definition
//!
//! Renders the controller under test into a single-container pod.

use k8s_openapi::api::core::v1::{
    Container, EnvVar, EnvVarSource, ObjectFieldSelector, Pod, PodSpec,
};
use kube::core::ObjectMeta;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default name of the controller workload
pub const DEFAULT_WORKLOAD_NAME: &str = "kube-etcd-controller";

/// Env var through which the controller learns its namespace
pub const DEFAULT_NAMESPACE_ENV: &str = "MY_POD_NAMESPACE";

/// Immutable description of the controller workload
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkloadSpec {
    pub name: String,
    pub image: String,
    pub labels: BTreeMap<String, String>,
    pub namespace_env: String,
}

impl WorkloadSpec {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        let name = name.into();
        let mut labels = BTreeMap::new();
        labels.insert("name".to_string(), name.clone());

        Self {
            name,
            image: image.into(),
            labels,
            namespace_env: DEFAULT_NAMESPACE_ENV.to_string(),
        }
    }

    pub fn with_namespace_env(mut self, var: impl Into<String>) -> Self {
        self.namespace_env = var.into();
        self
    }

    /// Pod manifest submitted to the API server
    pub fn to_pod(&self) -> Pod {
        Pod {
            metadata: ObjectMeta {
                name: Some(self.name.clone()),
                labels: Some(self.labels.clone()),
                ..Default::default()
            },
            spec: Some(PodSpec {
                containers: vec![Container {
                    name: self.name.clone(),
                    image: Some(self.image.clone()),
                    env: Some(vec![EnvVar {
                        name: self.namespace_env.clone(),
                        value_from: Some(EnvVarSource {
                            field_ref: Some(ObjectFieldSelector {
                                field_path: "metadata.namespace".to_string(),
                                ..Default::default()
                            }),
                            ..Default::default()
                        }),
                        ..Default::default()
                    }]),
                    ..Default::default()
                }],
                restart_policy: Some("Never".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

/// What the cluster reports about a running workload
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadSummary {
    pub name: String,
    pub images: Vec<String>,
}

impl WorkloadSummary {
    pub fn from_pod(pod: &Pod) -> Self {
        let images = pod
            .spec
            .as_ref()
            .map(|spec| {
                spec.containers
                    .iter()
                    .filter_map(|c| c.image.clone())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            name: pod.metadata.name.clone().unwrap_or_default(),
            images,
        }
    }

    pub fn runs_image(&self, image: &str) -> bool {
        self.images.iter().any(|i| i == image)
    }
}
