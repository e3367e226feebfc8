//! Controller provisioning
//!
//! Submits the controller workload into a fresh namespace and waits for the
//! custom resource type it registers.

use tracing::{error, info};

use super::health::ReadinessPoller;
use crate::framework::Result;
use crate::k8s::{
    CustomResourceSpec, Platform, WorkloadSpec, DEFAULT_NAMESPACE_ENV, DEFAULT_WORKLOAD_NAME,
};
use crate::utils::Clock;

/// Deploys the controller under test
pub struct Provisioner<'a, C: Clock + ?Sized> {
    workload_name: String,
    namespace_env: String,
    resource: CustomResourceSpec,
    poller: ReadinessPoller<'a, C>,
}

impl<'a, C: Clock + ?Sized> Provisioner<'a, C> {
    pub fn new(poller: ReadinessPoller<'a, C>) -> Self {
        Self {
            workload_name: DEFAULT_WORKLOAD_NAME.to_string(),
            namespace_env: DEFAULT_NAMESPACE_ENV.to_string(),
            resource: CustomResourceSpec::default(),
            poller,
        }
    }

    pub fn workload_name(mut self, name: impl Into<String>) -> Self {
        self.workload_name = name.into();
        self
    }

    pub fn namespace_env(mut self, var: impl Into<String>) -> Self {
        self.namespace_env = var.into();
        self
    }

    pub fn resource(mut self, resource: CustomResourceSpec) -> Self {
        self.resource = resource;
        self
    }

    /// Workload definition for `image`
    pub fn workload(&self, image: &str) -> WorkloadSpec {
        WorkloadSpec::new(&self.workload_name, image).with_namespace_env(&self.namespace_env)
    }

    /// Create the controller in `namespace` and wait until its custom
    /// resource type is served
    pub async fn provision<P: Platform + ?Sized>(
        &self,
        platform: &P,
        namespace: &str,
        image: &str,
    ) -> Result<()> {
        let workload = self.workload(image);
        platform.create_workload(namespace, &workload).await?;
        info!("Submitted {} ({}) to {}", workload.name, image, namespace);

        if let Err(e) = self
            .poller
            .wait_until_ready(platform, platform.host(), namespace, &self.resource)
            .await
        {
            error!("fail to setup {}: {}", workload.name, e);
            return Err(e);
        }

        info!("{} created successfully", workload.name);
        Ok(())
    }
}
