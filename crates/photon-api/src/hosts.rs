//! Infrastructure host management.

use photon_core::{RestClient, Task};
use urlencoding::encode;

use crate::models::{Host, HostCreateSpec};
use crate::Result;

const HOSTS_PATH: &str = "/infrastructure/hosts";

/// Operations on `/infrastructure/hosts`.
#[derive(Debug, Clone)]
pub struct InfraHostsApi {
    client: RestClient,
}

impl InfraHostsApi {
    pub(crate) fn new(client: RestClient) -> Self {
        Self { client }
    }

    /// Register a host.
    pub async fn create(&self, spec: &HostCreateSpec) -> Result<Task> {
        self.client.post_task(HOSTS_PATH, Some(spec)).await
    }

    /// List all hosts.
    pub async fn list(&self) -> Result<Vec<Host>> {
        self.client.get_list(HOSTS_PATH, &[]).await
    }

    /// Fetch a host.
    pub async fn get(&self, id: &str) -> Result<Host> {
        self.client.get_json(&format!("{HOSTS_PATH}/{}", encode(id))).await
    }

    /// Remove a host.
    pub async fn delete(&self, id: &str) -> Result<Task> {
        self.client
            .delete_task(&format!("{HOSTS_PATH}/{}", encode(id)))
            .await
    }

    /// Suspend a host.
    pub async fn suspend(&self, id: &str) -> Result<Task> {
        self.action(id, "suspend").await
    }

    /// Resume a suspended host.
    pub async fn resume(&self, id: &str) -> Result<Task> {
        self.action(id, "resume").await
    }

    /// Put a host into maintenance mode.
    pub async fn enter_maintenance_mode(&self, id: &str) -> Result<Task> {
        self.action(id, "enter-maintenance").await
    }

    /// Take a host out of maintenance mode.
    pub async fn exit_maintenance_mode(&self, id: &str) -> Result<Task> {
        self.action(id, "exit-maintenance").await
    }

    async fn action(&self, id: &str, action: &str) -> Result<Task> {
        self.client
            .post_task::<()>(&format!("{HOSTS_PATH}/{}/{action}", encode(id)), None)
            .await
    }
}
