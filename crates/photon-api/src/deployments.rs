//! Deployment management.

use photon_core::{RestClient, Task};
use urlencoding::encode;

use crate::models::{
    Deployment, DeploymentCreateSpec, NsxCniConfigurationSpec, NsxConfigurationSpec,
    ServiceConfigurationSpec, Vm,
};
use crate::tasks::TasksApi;
use crate::Result;

const DEPLOYMENTS_PATH: &str = "/deployments";

/// Operations on `/deployments`.
#[derive(Debug, Clone)]
pub struct DeploymentsApi {
    client: RestClient,
}

impl DeploymentsApi {
    pub(crate) fn new(client: RestClient) -> Self {
        Self { client }
    }

    fn entity_path(id: &str) -> String {
        format!("{DEPLOYMENTS_PATH}/{}", encode(id))
    }

    /// Create a deployment.
    pub async fn create(&self, spec: &DeploymentCreateSpec) -> Result<Task> {
        self.client.post_task(DEPLOYMENTS_PATH, Some(spec)).await
    }

    /// Create a deployment and wait for the creation task to finish.
    pub async fn create_and_wait(&self, spec: &DeploymentCreateSpec) -> Result<Task> {
        let task = self.create(spec).await?;
        TasksApi::new(self.client.clone()).wait(&task.id).await
    }

    /// List all deployments.
    pub async fn list(&self) -> Result<Vec<Deployment>> {
        self.client.get_list(DEPLOYMENTS_PATH, &[]).await
    }

    /// Fetch a deployment.
    pub async fn get(&self, id: &str) -> Result<Deployment> {
        self.client.get_json(&Self::entity_path(id)).await
    }

    /// Delete a deployment.
    pub async fn delete(&self, id: &str) -> Result<Task> {
        self.client.delete_task(&Self::entity_path(id)).await
    }

    /// List the VMs of a deployment.
    pub async fn list_vms(&self, id: &str) -> Result<Vec<Vm>> {
        let path = format!("{}/vms", Self::entity_path(id));
        self.client.get_list(&path, &[]).await
    }

    /// Enable a service type on a deployment.
    pub async fn enable_service_type(
        &self,
        id: &str,
        spec: &ServiceConfigurationSpec,
    ) -> Result<Task> {
        let path = format!("{}/enable_service_type", Self::entity_path(id));
        self.client.post_task(&path, Some(spec)).await
    }

    /// Disable a service type on a deployment.
    pub async fn disable_service_type(
        &self,
        id: &str,
        spec: &ServiceConfigurationSpec,
    ) -> Result<Task> {
        let path = format!("{}/disable_service_type", Self::entity_path(id));
        self.client.post_task(&path, Some(spec)).await
    }

    /// Configure NSX networking.
    pub async fn configure_nsx(&self, id: &str, spec: &NsxConfigurationSpec) -> Result<Task> {
        let path = format!("{}/configure_nsx", Self::entity_path(id));
        self.client.post_task(&path, Some(spec)).await
    }

    /// Configure NSX container networking.
    pub async fn configure_nsx_cni(
        &self,
        id: &str,
        spec: &NsxCniConfigurationSpec,
    ) -> Result<Task> {
        let path = format!("{}/configure_nsx_cni", Self::entity_path(id));
        self.client.post_task(&path, Some(spec)).await
    }
}
