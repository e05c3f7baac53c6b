//! The generated install variables document.
//!
//! [`VarsDocument`] is the single structured file every playbook in the
//! install sequence reads. Field names match the argument names of the NSX-T
//! Ansible modules, and struct field order is the order keys appear in the
//! written file.

pub mod builder;

use crate::error::{ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::debug;

pub use builder::VarsBuilder;

/// Desired state marker used throughout the document.
pub const STATE_PRESENT: &str = "present";

/// On-disk encoding of the variables file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarsFormat {
    /// Two-space indented JSON (also valid YAML)
    #[default]
    Json,
    /// Block-style YAML
    Yaml,
}

/// Top-level variables document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarsDocument {
    pub state: String,
    pub nsx_username: String,
    pub nsx_password: String,
    pub validate_certs: bool,
    pub nsx_ova_path: String,
    pub nsx_ova: String,
    pub domain: String,
    pub netmask: String,
    pub gateway: String,
    pub dns_server: String,
    pub ntp_server: String,
    pub nsx_vcenter_fqdn: String,
    pub nsx_vcenter_username: String,
    pub nsx_vcenter_password: String,
    pub nsx_node1: ManagerNode,
    pub additional_nodes: Vec<AdditionalNode>,
    pub compute_managers: Vec<ComputeManager>,
    pub nsxt_licenses: Vec<License>,
    pub transport_zones: Vec<TransportZone>,
    pub ip_pools: Vec<IpPool>,
    pub edge_transport_nodes: Vec<EdgeTransportNode>,
    pub edge_clusters: Vec<EdgeCluster>,
    pub tier0_gateways: Vec<Tier0Gateway>,
    pub host_switch_profiles: Vec<UplinkProfile>,
    pub transport_node_profiles: Vec<TransportNodeProfile>,
    pub transport_node_collections: Vec<TransportNodeCollection>,
}

impl VarsDocument {
    /// Render the document in the given format.
    pub fn render(&self, format: VarsFormat) -> Result<String> {
        let mut out = match format {
            VarsFormat::Json => serde_json::to_string_pretty(self)?,
            VarsFormat::Yaml => serde_yaml::to_string(self)?,
        };
        if !out.ends_with('\n') {
            out.push('\n');
        }
        Ok(out)
    }

    /// Write the document to `path`, replacing any previous file.
    ///
    /// The document carries NSX and vCenter passwords, so on unix the file is
    /// readable by its owner only, including when it already existed.
    pub fn write(&self, path: impl AsRef<Path>, format: VarsFormat) -> Result<()> {
        let path = path.as_ref();
        let content = self.render(format)?;
        let context = || format!("Failed to write variables file {}", path.display());

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(path).with_context(context)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))
                .with_context(context)?;
        }
        file.write_all(content.as_bytes()).with_context(context)?;
        debug!(file = %path.display(), ?format, "Wrote variables file");
        Ok(())
    }

    /// True when secondary manager nodes are part of this deployment.
    pub fn is_manager_cluster(&self) -> bool {
        !self.additional_nodes.is_empty()
    }
}

// ============================================================================
// Manager Nodes
// ============================================================================

/// First NSX Manager node, deployed from the OVA.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerNode {
    pub hostname: String,
    pub mgmt_ip: String,
    pub datacenter: String,
    pub cluster: String,
    pub datastore: String,
    pub portgroup: String,
}

/// Second and third NSX Manager nodes, deployed through the first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalNode {
    pub hostname: String,
    pub mgmt_ip: String,
    pub prefix: u8,
    pub datacenter: String,
    pub cluster: String,
    pub datastore: String,
    pub portgroup: String,
    pub vcenter: String,
    pub vcenter_user: String,
    pub vcenter_pass: String,
}

// ============================================================================
// Compute Managers & Licensing
// ============================================================================

/// A vCenter registered with NSX Manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeManager {
    pub display_name: String,
    pub mgmt_ip: String,
    pub origin_type: String,
    pub credential_type: String,
    pub username: String,
    pub password: String,
    pub set_as_oidc_provider: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    pub license_key: String,
}

// ============================================================================
// Transport Zones & IP Pools
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportZone {
    pub display_name: String,
    pub transport_type: String,
}

/// A tunnel endpoint address pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpPool {
    pub display_name: String,
    pub pool_static_subnets: Vec<StaticSubnet>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticSubnet {
    pub state: String,
    pub id: String,
    pub allocation_ranges: Vec<AllocationRange>,
    pub gateway_ip: String,
    pub cidr: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRange {
    pub start: String,
    pub end: String,
}

// ============================================================================
// Host Switches (shared by edges and host profiles)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSwitchSpec {
    pub resource_type: String,
    pub host_switches: Vec<HostSwitch>,
}

/// A host switch on an edge (N-VDS) or a host transport node profile (VDS).
///
/// Edge switches are identified by name and bind physical NICs; host VDS
/// switches are identified by the vCenter switch UUID and map VDS uplinks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSwitch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_switch_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_switch_id: Option<String>,
    pub host_switch_type: String,
    pub host_switch_mode: String,
    pub host_switch_profiles: Vec<ProfileRef>,
    pub pnics: Vec<Pnic>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uplinks: Option<Vec<VdsUplink>>,
    pub ip_assignment_spec: IpAssignmentSpec,
    pub transport_zone_endpoints: Vec<TransportZoneEndpoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRef {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pnic {
    pub device_name: String,
    pub uplink_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VdsUplink {
    pub vds_uplink_name: String,
    pub uplink_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpAssignmentSpec {
    pub resource_type: String,
    pub ip_pool_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportZoneEndpoint {
    pub transport_zone_name: String,
}

// ============================================================================
// Edge Transport Nodes
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeTransportNode {
    pub host_switch_spec: HostSwitchSpec,
    pub node_deployment_info: NodeDeploymentInfo,
    pub display_name: String,
    pub resource_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDeploymentInfo {
    pub deployment_type: String,
    pub deployment_config: DeploymentConfig,
    pub node_settings: NodeSettings,
    pub resource_type: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    pub vm_deployment_config: VmDeploymentConfig,
    pub form_factor: String,
    pub node_user_settings: NodeUserSettings,
}

/// Where and how the edge VM is placed in vCenter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmDeploymentConfig {
    pub vc_name: String,
    pub vc_username: String,
    pub vc_password: String,
    pub compute: String,
    pub storage: String,
    pub management_network: String,
    pub hostname: String,
    pub management_port_subnets: Vec<PortSubnet>,
    pub default_gateway_addresses: Vec<String>,
    pub data_networks: Vec<String>,
    pub enable_ssh: bool,
    pub allow_ssh_root_login: bool,
    pub placement_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSubnet {
    pub ip_addresses: Vec<String>,
    pub prefix_length: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeUserSettings {
    pub cli_username: String,
    pub cli_password: String,
    pub root_password: String,
    pub audit_username: String,
    pub audit_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSettings {
    pub hostname: String,
    pub enable_ssh: bool,
    pub allow_ssh_root_login: bool,
}

// ============================================================================
// Edge Cluster & Tier0
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeCluster {
    pub display_name: String,
    pub cluster_profile_bindings: Vec<ClusterProfileBinding>,
    pub members: Vec<EdgeClusterMember>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterProfileBinding {
    pub profile_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeClusterMember {
    pub transport_node_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier0Gateway {
    pub display_name: String,
    pub ha_mode: String,
    pub locale_services: Vec<LocaleService>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleService {
    pub state: String,
    pub id: String,
    pub route_redistribution_types: Vec<String>,
    pub edge_cluster_info: EdgeClusterInfo,
    #[serde(rename = "BGP")]
    pub bgp: Bgp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeClusterInfo {
    pub edge_cluster_display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bgp {
    pub state: String,
    pub local_as_num: String,
}

// ============================================================================
// Host Preparation
// ============================================================================

/// Uplink host switch profile applied to compute hosts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UplinkProfile {
    pub display_name: String,
    pub resource_type: String,
    pub mtu: String,
    pub teaming: Teaming,
    pub transport_vlan: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teaming {
    pub standby_list: Vec<TeamingUplink>,
    pub active_list: Vec<TeamingUplink>,
    pub policy: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamingUplink {
    pub uplink_name: String,
    pub uplink_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportNodeProfile {
    pub resource_type: String,
    pub display_name: String,
    pub host_switch_spec: HostSwitchSpec,
    pub description: String,
}

/// Binds a transport node profile to one vSphere compute cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportNodeCollection {
    pub state: String,
    pub display_name: String,
    pub description: String,
    pub resource_type: String,
    pub compute_manager_name: String,
    pub cluster_name: String,
    pub transport_node_profile_name: String,
}
