//! Request and response records for the Photon resource APIs.
//!
//! Field names follow the wire format (camelCase). Optional fields are omitted
//! when serializing so that request bodies only carry what the caller set.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Filters for `GET /tasks`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListParams {
    /// Only tasks acting on this entity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    /// Only tasks acting on this kind of entity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_kind: Option<String>,
    /// Only tasks in this state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl TaskListParams {
    /// Filter on the entity id.
    #[must_use]
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Filter on the entity kind.
    #[must_use]
    pub fn with_entity_kind(mut self, kind: impl Into<String>) -> Self {
        self.entity_kind = Some(kind.into());
        self
    }

    /// Filter on the task state.
    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Convert the filters into query parameters.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        [
            ("entityId", &self.entity_id),
            ("entityKind", &self.entity_kind),
            ("state", &self.state),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.clone().map(|value| (key, value)))
        .collect()
    }
}

/// Authentication settings of a deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthInfo {
    /// Whether authentication is enabled
    #[serde(default)]
    pub enabled: bool,
    /// Address of the identity service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Port of the identity service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Identity tenant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,
    /// Administrator user name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Administrator password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Groups granted administrative rights
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security_groups: Vec<String>,
}

/// Body of `POST /deployments`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentCreateSpec {
    /// Datastores that hold images
    pub image_datastores: Vec<String>,
    /// Place VMs on the image datastores
    #[serde(default)]
    pub use_image_datastore_for_vms: bool,
    /// Authentication settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthInfo>,
    /// Remote syslog endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syslog_endpoint: Option<String>,
    /// NTP server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ntp_endpoint: Option<String>,
    /// Whether the deployment fronts its services with a load balancer
    #[serde(default)]
    pub load_balancer_enabled: bool,
}

/// A deployment as reported by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    /// Deployment identifier
    pub id: String,
    /// Resource kind
    #[serde(default)]
    pub kind: String,
    /// Lifecycle state
    #[serde(default)]
    pub state: String,
    /// Datastores that hold images
    #[serde(default)]
    pub image_datastores: Vec<String>,
    /// Place VMs on the image datastores
    #[serde(default)]
    pub use_image_datastore_for_vms: bool,
    /// Authentication settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthInfo>,
    /// Remote syslog endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syslog_endpoint: Option<String>,
    /// NTP server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ntp_endpoint: Option<String>,
    /// Whether a load balancer is enabled
    #[serde(default)]
    pub load_balancer_enabled: bool,
    /// Load balancer address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_balancer_address: Option<String>,
    /// Service types enabled on this deployment
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub service_configurations: Vec<ServiceConfigurationSpec>,
    /// Canonical URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
}

/// Service type to enable or disable on a deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfigurationSpec {
    /// Service type, e.g. `KUBERNETES`
    #[serde(rename = "type")]
    pub service_type: String,
    /// Image used for the service's VMs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
}

/// Inclusive IP address range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpRange {
    /// First address
    pub start: String,
    /// Last address
    pub end: String,
}

/// NSX network virtualization settings for a deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NsxConfigurationSpec {
    /// NSX manager address
    pub nsx_address: String,
    /// NSX manager user name
    pub nsx_username: String,
    /// NSX manager password
    pub nsx_password: String,
    /// DHCP server addresses keyed by private address
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub dhcp_server_addresses: HashMap<String, String>,
    /// Root CIDR for private networks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_ip_root_cidr: Option<String>,
    /// Range for floating addresses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floating_ip_root_range: Option<IpRange>,
    /// Tier-0 router
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t0_router_id: Option<String>,
    /// Edge cluster
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_cluster_id: Option<String>,
    /// Overlay transport zone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay_transport_zone_id: Option<String>,
    /// Tunnel IP pool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tunnel_ip_pool_id: Option<String>,
    /// Host uplink NIC
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_uplink_pnic: Option<String>,
    /// Host uplink VLAN
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_uplink_vlan_id: Option<u16>,
    /// DNS servers handed to workloads
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dns_server_addresses: Vec<String>,
}

/// NSX container networking settings for a deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NsxCniConfigurationSpec {
    /// NSX manager address
    pub nsx_address: String,
    /// NSX manager user name
    pub nsx_username: String,
    /// NSX manager password
    pub nsx_password: String,
    /// Tier-0 router for pod traffic
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t0_router_id: Option<String>,
    /// Overlay transport zone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay_transport_zone_id: Option<String>,
    /// IP block for pods
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_ip_block_id: Option<String>,
    /// IP pool for externally exposed services
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_ip_pool_id: Option<String>,
}

/// Body of `POST /infrastructure/hosts`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostCreateSpec {
    /// Host address
    pub address: String,
    /// Login user
    pub username: String,
    /// Login password
    pub password: String,
    /// Usage tags, e.g. `CLOUD`
    #[serde(rename = "usageTags", default)]
    pub tags: Vec<String>,
    /// Availability zone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
    /// Free-form metadata
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

/// An infrastructure host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Host {
    /// Host identifier
    pub id: String,
    /// Resource kind
    #[serde(default)]
    pub kind: String,
    /// Host address
    #[serde(default)]
    pub address: String,
    /// Lifecycle state
    #[serde(default)]
    pub state: String,
    /// Usage tags
    #[serde(rename = "usageTags", default)]
    pub tags: Vec<String>,
    /// Availability zone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
    /// ESX version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub esx_version: Option<String>,
    /// Free-form metadata
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
    /// Canonical URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
}

/// A virtual router.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Router {
    /// Router identifier
    pub id: String,
    /// Resource kind
    #[serde(default)]
    pub kind: String,
    /// Router name
    #[serde(default)]
    pub name: String,
    /// Private address range
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_ip_cidr: Option<String>,
    /// Canonical URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
}

/// Body of `POST /routers/{id}/set_router_name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterSetNameOperation {
    /// New router name
    pub router_name: String,
}

/// Body of `PATCH /routers/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterUpdateSpec {
    /// New router name
    #[serde(rename = "name")]
    pub router_name: String,
}

/// A service (e.g. a Kubernetes cluster) running on the deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// Service identifier
    pub id: String,
    /// Resource kind
    #[serde(default)]
    pub kind: String,
    /// Service name
    #[serde(default)]
    pub name: String,
    /// Lifecycle state
    #[serde(default)]
    pub state: String,
    /// Service type
    #[serde(rename = "type", default)]
    pub service_type: String,
    /// Owning project
    #[serde(rename = "projectID", default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Image the service's VMs run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    /// Number of worker VMs
    #[serde(default)]
    pub worker_count: u32,
    /// Reason the service is in an error state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
    /// Type-specific properties; keys are listed in [`crate::services`]
    #[serde(default)]
    pub extended_properties: HashMap<String, String>,
    /// Canonical URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
}

/// Body of `POST /services/{id}/resize`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResizeOperation {
    /// Target worker count
    pub new_worker_count: u32,
}

/// Body of `POST /services/{id}/change_version`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceChangeVersionOperation {
    /// Image of the new version
    pub new_image_id: String,
}

/// A virtual machine belonging to a deployment or service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vm {
    /// VM identifier
    pub id: String,
    /// Resource kind
    #[serde(default)]
    pub kind: String,
    /// VM name
    #[serde(default)]
    pub name: String,
    /// Lifecycle state
    #[serde(default)]
    pub state: String,
    /// Flavor name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flavor: Option<String>,
    /// Image the VM booted from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_image_id: Option<String>,
    /// Host the VM runs on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Datastore holding the VM
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datastore: Option<String>,
    /// Tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Canonical URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
}
