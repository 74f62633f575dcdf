//! Service management and the keys of service extended properties.

use photon_core::{RestClient, Task};
use urlencoding::encode;

use crate::models::{Service, ServiceChangeVersionOperation, ServiceResizeOperation, Vm};
use crate::Result;

const SERVICES_PATH: &str = "/services";

/// DNS server
pub const EXTENDED_PROPERTY_DNS: &str = "dns";
/// Default gateway
pub const EXTENDED_PROPERTY_GATEWAY: &str = "gateway";
/// Network mask
pub const EXTENDED_PROPERTY_NETMASK: &str = "netmask";
/// Load balancer address
pub const EXTENDED_PROPERTY_LOAD_BALANCER_IP: &str = "load_balancer_ip";
/// Number of master nodes
pub const EXTENDED_PROPERTY_MASTER_COUNT: &str = "master_count";
/// Comma-separated master addresses
pub const EXTENDED_PROPERTY_MASTER_IPS: &str = "master_ips";
/// Primary master address
pub const EXTENDED_PROPERTY_MASTER_IP: &str = "master_ip";
/// Secondary master address
pub const EXTENDED_PROPERTY_MASTER_IP2: &str = "master_ip2";
/// Container network CIDR
pub const EXTENDED_PROPERTY_CONTAINER_NETWORK: &str = "container_network";
/// First ZooKeeper address
pub const EXTENDED_PROPERTY_ZOOKEEPER_IP1: &str = "zookeeper_ip1";
/// Second ZooKeeper address
pub const EXTENDED_PROPERTY_ZOOKEEPER_IP2: &str = "zookeeper_ip2";
/// Third ZooKeeper address
pub const EXTENDED_PROPERTY_ZOOKEEPER_IP3: &str = "zookeeper_ip3";
/// Number of etcd nodes
pub const EXTENDED_PROPERTY_ETCD_COUNT: &str = "etcd_count";
/// First etcd address
pub const EXTENDED_PROPERTY_ETCD_IP1: &str = "etcd_ip1";
/// Second etcd address
pub const EXTENDED_PROPERTY_ETCD_IP2: &str = "etcd_ip2";
/// Third etcd address
pub const EXTENDED_PROPERTY_ETCD_IP3: &str = "etcd_ip3";
/// SSH public key installed on service VMs
pub const EXTENDED_PROPERTY_SSH_KEY: &str = "ssh_key";
/// CA certificate of the image registry
pub const EXTENDED_PROPERTY_REGISTRY_CA_CERT: &str = "registry_ca_cert";
/// Administrator password
pub const EXTENDED_PROPERTY_ADMIN_PASSWORD: &str = "admin_password";

/// Operations on `/services`.
#[derive(Debug, Clone)]
pub struct ServicesApi {
    client: RestClient,
}

impl ServicesApi {
    pub(crate) fn new(client: RestClient) -> Self {
        Self { client }
    }

    /// Fetch a service.
    pub async fn get(&self, id: &str) -> Result<Service> {
        self.client.get_json(&format!("{SERVICES_PATH}/{}", encode(id))).await
    }

    /// Delete a service.
    pub async fn delete(&self, id: &str) -> Result<Task> {
        self.client
            .delete_task(&format!("{SERVICES_PATH}/{}", encode(id)))
            .await
    }

    /// List the VMs of a service.
    pub async fn list_vms(&self, id: &str) -> Result<Vec<Vm>> {
        self.client
            .get_list(&format!("{SERVICES_PATH}/{}/vms", encode(id)), &[])
            .await
    }

    /// Change the worker count of a service.
    pub async fn resize(&self, id: &str, operation: &ServiceResizeOperation) -> Result<Task> {
        let path = format!("{SERVICES_PATH}/{}/resize", encode(id));
        self.client.post_task(&path, Some(operation)).await
    }

    /// Start maintenance of a service.
    pub async fn trigger_maintenance(&self, id: &str) -> Result<Task> {
        let path = format!("{SERVICES_PATH}/{}/trigger_maintenance", encode(id));
        self.client.post_task::<()>(&path, None).await
    }

    /// Upgrade a service to a new image.
    pub async fn change_version(
        &self,
        id: &str,
        operation: &ServiceChangeVersionOperation,
    ) -> Result<Task> {
        let path = format!("{SERVICES_PATH}/{}/change_version", encode(id));
        self.client.post_task(&path, Some(operation)).await
    }
}
