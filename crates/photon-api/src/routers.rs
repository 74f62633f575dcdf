//! Virtual router management.

use photon_core::{RestClient, Task};
use urlencoding::encode;

use crate::models::{Router, RouterSetNameOperation, RouterUpdateSpec};
use crate::Result;

const ROUTERS_PATH: &str = "/routers";

/// Operations on `/routers`.
#[derive(Debug, Clone)]
pub struct RoutersApi {
    client: RestClient,
}

impl RoutersApi {
    pub(crate) fn new(client: RestClient) -> Self {
        Self { client }
    }

    /// Fetch a router.
    pub async fn get(&self, id: &str) -> Result<Router> {
        self.client.get_json(&format!("{ROUTERS_PATH}/{}", encode(id))).await
    }

    /// Rename a router.
    pub async fn set_name(&self, id: &str, operation: &RouterSetNameOperation) -> Result<Task> {
        let path = format!("{ROUTERS_PATH}/{}/set_router_name", encode(id));
        self.client.post_task(&path, Some(operation)).await
    }

    /// Update router properties.
    pub async fn update(&self, id: &str, spec: &RouterUpdateSpec) -> Result<Task> {
        self.client
            .patch_task(&format!("{ROUTERS_PATH}/{}", encode(id)), spec)
            .await
    }

    /// Delete a router.
    pub async fn delete(&self, id: &str) -> Result<Task> {
        self.client
            .delete_task(&format!("{ROUTERS_PATH}/{}", encode(id)))
            .await
    }
}
