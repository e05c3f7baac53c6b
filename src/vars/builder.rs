//! Builds the variables document from the defaults and user parameter files.
//!
//! The transform is pure: every value comes from the two [`ParamFile`]s plus
//! the host switch UUID, which the caller resolves from vCenter beforehand.
//! Identical inputs always produce an identical document.

use super::*;
use crate::error::{Error, Result};
use crate::params::ParamFile;
use tracing::{debug, warn};

/// Most uplinks an edge or host switch can be configured with.
pub const MAX_UPLINKS: u32 = 2;

/// BGP AS number used when `Tier0_BGP_AS_Number` is left empty.
pub const DEFAULT_LOCAL_AS: &str = "1121";

const EDGE_PNICS: [(&str, &str); 2] = [("fp-eth0", "uplink-1"), ("fp-eth1", "uplink-2")];
const HOST_UPLINKS: [(&str, &str); 2] = [("Uplink 1", "uplink-1"), ("Uplink 2", "uplink-2")];

const UPLINK_PROFILE: &str = "UplinkHostSwitchProfile";
const STANDARD_SPEC: &str = "StandardHostSwitchSpec";
const STATIC_IP_POOL: &str = "StaticIpPoolSpec";

/// Assembles a [`VarsDocument`].
pub struct VarsBuilder<'a> {
    defaults: &'a ParamFile,
    user: &'a ParamFile,
}

impl<'a> VarsBuilder<'a> {
    /// Create a builder over the factory defaults and the user configuration.
    pub fn new(defaults: &'a ParamFile, user: &'a ParamFile) -> Self {
        Self { defaults, user }
    }

    /// Whether the second and third manager nodes will be deployed.
    pub fn manager_cluster(&self) -> Result<bool> {
        self.user.is_affirmative("nsx_manager_cluster")
    }

    /// Whether NSX is deployed into the same vCenter it registers as compute manager.
    pub fn shares_vcenter(&self) -> Result<bool> {
        Ok(self.user.require("nsx_vcenter_fqdn")? == self.user.require("vcenter_fqdn")?)
    }

    /// Display name of the vCenter the managers and edges are deployed through.
    ///
    /// When NSX deploys into the compute manager vCenter there is only one
    /// registration, named `compute_manager_name`.
    pub fn deployment_vcenter(&self) -> Result<String> {
        if self.shares_vcenter()? {
            self.defaults.string("compute_manager_name")
        } else {
            self.defaults.string("nsx_vcenter")
        }
    }

    /// Check every parameter the document needs without resolving the host switch.
    ///
    /// Uplink limits, prefixes and missing keys surface here, so callers can
    /// fail before contacting vCenter.
    pub fn validate(&self) -> Result<()> {
        self.build("").map(|_| ())
    }

    /// Build the document. `host_switch_id` is the vCenter UUID of `host_vds_name`.
    pub fn build(&self, host_switch_id: &str) -> Result<VarsDocument> {
        let d = self.defaults;
        let u = self.user;

        let doc = VarsDocument {
            state: STATE_PRESENT.to_string(),
            nsx_username: d.string("nsx_username")?,
            nsx_password: u.string("nsx_password")?,
            validate_certs: d.require_bool("validate_certs")?,
            nsx_ova_path: u.string("nsx_ova_path")?,
            nsx_ova: u.string("nsx_ova")?,
            domain: u.string("domain")?,
            netmask: u.string("netmask")?,
            gateway: u.string("gateway")?,
            dns_server: u.string("dns_server")?,
            ntp_server: u.string("ntp_server")?,
            nsx_vcenter_fqdn: u.string("nsx_vcenter_fqdn")?,
            nsx_vcenter_username: u.string("nsx_vcenter_username")?,
            nsx_vcenter_password: u.string("nsx_vcenter_password")?,
            nsx_node1: self.first_node()?,
            additional_nodes: self.additional_nodes()?,
            compute_managers: self.compute_managers()?,
            nsxt_licenses: vec![License {
                license_key: u.string("nsx_license_key")?,
            }],
            transport_zones: self.transport_zones()?,
            ip_pools: vec![self.ip_pool("ip_pool_1")?, self.ip_pool("ip_pool_2")?],
            edge_transport_nodes: vec![self.edge_node(1)?, self.edge_node(2)?],
            edge_clusters: vec![self.edge_cluster()?],
            tier0_gateways: vec![self.tier0_gateway()?],
            host_switch_profiles: vec![self.uplink_profile()?],
            transport_node_profiles: vec![self.transport_node_profile(host_switch_id)?],
            transport_node_collections: self.transport_node_collections()?,
        };

        debug!(
            additional_nodes = doc.additional_nodes.len(),
            compute_managers = doc.compute_managers.len(),
            collections = doc.transport_node_collections.len(),
            "Built variables document"
        );
        Ok(doc)
    }

    fn first_node(&self) -> Result<ManagerNode> {
        let u = self.user;
        Ok(ManagerNode {
            hostname: u.string("node1_hostname")?,
            mgmt_ip: u.string("node1_mgmt_ip")?,
            datacenter: u.string("node1_datacenter")?,
            cluster: u.string("node1_cluster")?,
            datastore: u.string("node1_datastore")?,
            portgroup: u.string("node1_portgroup")?,
        })
    }

    fn additional_nodes(&self) -> Result<Vec<AdditionalNode>> {
        if !self.manager_cluster()? {
            debug!("Standalone manager, no additional nodes");
            return Ok(Vec::new());
        }

        let vcenter = self.deployment_vcenter()?;
        ["node2", "node3"]
            .into_iter()
            .map(|node| {
                let u = self.user;
                let key = |field: &str| format!("{node}_{field}");
                Ok(AdditionalNode {
                    hostname: u.string(&key("hostname"))?,
                    mgmt_ip: u.string(&key("mgmt_ip"))?,
                    prefix: u.require_prefix(&key("netmask_prefix"))?,
                    datacenter: u.string(&key("datacenter"))?,
                    cluster: u.string(&key("cluster"))?,
                    datastore: u.string(&key("datastore"))?,
                    portgroup: u.string(&key("portgroup"))?,
                    vcenter: vcenter.clone(),
                    vcenter_user: u.string("nsx_vcenter_username")?,
                    vcenter_pass: u.string("nsx_vcenter_password")?,
                })
            })
            .collect()
    }

    fn compute_managers(&self) -> Result<Vec<ComputeManager>> {
        let d = self.defaults;
        let u = self.user;

        let mut managers = vec![ComputeManager {
            display_name: d.string("compute_manager_name")?,
            mgmt_ip: u.string("vcenter_fqdn")?,
            origin_type: "vCenter".to_string(),
            credential_type: "UsernamePasswordLoginCredential".to_string(),
            username: u.string("vcenter_username")?,
            password: u.string("vcenter_password")?,
            set_as_oidc_provider: true,
        }];

        if !self.shares_vcenter()? {
            managers.push(ComputeManager {
                display_name: d.string("nsx_vcenter")?,
                mgmt_ip: u.string("nsx_vcenter_fqdn")?,
                origin_type: "vCenter".to_string(),
                credential_type: "UsernamePasswordLoginCredential".to_string(),
                username: u.string("nsx_vcenter_username")?,
                password: u.string("nsx_vcenter_password")?,
                set_as_oidc_provider: false,
            });
        }

        Ok(managers)
    }

    fn transport_zones(&self) -> Result<Vec<TransportZone>> {
        Ok(vec![
            TransportZone {
                display_name: self.defaults.string("overlay_tz_name")?,
                transport_type: "OVERLAY".to_string(),
            },
            TransportZone {
                display_name: self.defaults.string("vlan_tz_name")?,
                transport_type: "VLAN".to_string(),
            },
        ])
    }

    /// `prefix` is `ip_pool_1` (edge TEPs) or `ip_pool_2` (host TEPs).
    fn ip_pool(&self, prefix: &str) -> Result<IpPool> {
        let u = self.user;
        let name = self.defaults.string(&format!("{prefix}_name"))?;

        Ok(IpPool {
            pool_static_subnets: vec![StaticSubnet {
                state: STATE_PRESENT.to_string(),
                id: format!("{name}_subnets"),
                allocation_ranges: vec![AllocationRange {
                    start: u.string(&format!("{prefix}_start"))?,
                    end: u.string(&format!("{prefix}_end"))?,
                }],
                gateway_ip: u.string(&format!("{prefix}_gateway"))?,
                cidr: u.string(&format!("{prefix}_cidr"))?,
            }],
            display_name: name,
        })
    }

    fn edge_node(&self, n: u8) -> Result<EdgeTransportNode> {
        let d = self.defaults;
        let u = self.user;
        let key = |field: &str| format!("edge{n}_{field}");

        let uplinks = self.uplink_count(&key("number_of_uplinks"), "Edge")?;
        // The first edge uplink is left to the management interface.
        let pnics = EDGE_PNICS
            .iter()
            .take(uplinks.saturating_sub(1) as usize)
            .map(|(device, uplink)| Pnic {
                device_name: (*device).to_string(),
                uplink_name: (*uplink).to_string(),
            })
            .collect();

        let host_switch = HostSwitch {
            host_switch_name: Some(d.string(&key("host_switch_name"))?),
            host_switch_id: None,
            host_switch_type: "NVDS".to_string(),
            host_switch_mode: "STANDARD".to_string(),
            host_switch_profiles: vec![ProfileRef {
                name: u.string(&key("host_switch_profile_name"))?,
                kind: UPLINK_PROFILE.to_string(),
            }],
            pnics,
            uplinks: None,
            ip_assignment_spec: IpAssignmentSpec {
                resource_type: STATIC_IP_POOL.to_string(),
                ip_pool_name: d.string("ip_pool_1_name")?,
            },
            transport_zone_endpoints: vec![self.overlay_endpoint()?],
        };

        let display_name = d.string(&key("display_name"))?;
        let fqdn = u.string(&key("fqdn"))?;
        let password = u.string(&key("system_password"))?;

        let vm_deployment_config = VmDeploymentConfig {
            vc_name: self.deployment_vcenter()?,
            vc_username: u.string("nsx_vcenter_username")?,
            vc_password: u.string("nsx_vcenter_password")?,
            compute: u.string(&key("cluster"))?,
            storage: u.string(&key("storage"))?,
            management_network: u.string(&key("mgmt_network"))?,
            hostname: fqdn.clone(),
            management_port_subnets: vec![PortSubnet {
                ip_addresses: vec![u.string(&key("mgmt_ip"))?],
                prefix_length: u.require_prefix(&key("mgmt_netmask_prefix"))?,
            }],
            default_gateway_addresses: vec![u.string(&key("default_gateway"))?],
            data_networks: vec![u.string(&key("data_network"))?],
            enable_ssh: true,
            allow_ssh_root_login: true,
            placement_type: "VsphereDeploymentConfig".to_string(),
        };

        Ok(EdgeTransportNode {
            host_switch_spec: HostSwitchSpec {
                resource_type: STANDARD_SPEC.to_string(),
                host_switches: vec![host_switch],
            },
            node_deployment_info: NodeDeploymentInfo {
                deployment_type: "VIRTUAL_MACHINE".to_string(),
                deployment_config: DeploymentConfig {
                    vm_deployment_config,
                    form_factor: d.string("edge_form_factor")?,
                    node_user_settings: NodeUserSettings {
                        cli_username: "admin".to_string(),
                        cli_password: password.clone(),
                        root_password: password.clone(),
                        audit_username: "audit".to_string(),
                        audit_password: password,
                    },
                },
                node_settings: NodeSettings {
                    hostname: fqdn,
                    enable_ssh: true,
                    allow_ssh_root_login: true,
                },
                resource_type: "EdgeNode".to_string(),
                display_name: display_name.clone(),
            },
            display_name,
            resource_type: "TransportNode".to_string(),
        })
    }

    fn edge_cluster(&self) -> Result<EdgeCluster> {
        let d = self.defaults;
        Ok(EdgeCluster {
            display_name: d.string("edge_cluster_display_name")?,
            cluster_profile_bindings: vec![ClusterProfileBinding {
                profile_name: d.string("edge_cluster_profile_binding")?,
            }],
            members: vec![
                EdgeClusterMember {
                    transport_node_name: d.string("edge1_display_name")?,
                },
                EdgeClusterMember {
                    transport_node_name: d.string("edge2_display_name")?,
                },
            ],
        })
    }

    fn tier0_gateway(&self) -> Result<Tier0Gateway> {
        let d = self.defaults;
        let name = d.string("tier0_display_name")?;

        let local_as_num = match self.user.get("Tier0_BGP_AS_Number") {
            Some(v) if !v.is_empty() => self.user.require_u32("Tier0_BGP_AS_Number")?.to_string(),
            _ => {
                warn!("Tier0_BGP_AS_Number not set, using AS {DEFAULT_LOCAL_AS}");
                DEFAULT_LOCAL_AS.to_string()
            }
        };

        Ok(Tier0Gateway {
            ha_mode: "ACTIVE_STANDBY".to_string(),
            locale_services: vec![LocaleService {
                state: STATE_PRESENT.to_string(),
                id: format!("{name}_service"),
                route_redistribution_types: vec![
                    "TIER0_STATIC".to_string(),
                    "TIER0_NAT".to_string(),
                ],
                edge_cluster_info: EdgeClusterInfo {
                    edge_cluster_display_name: d.string("edge_cluster_display_name")?,
                },
                bgp: Bgp {
                    state: STATE_PRESENT.to_string(),
                    local_as_num,
                },
            }],
            display_name: name,
        })
    }

    fn uplink_profile(&self) -> Result<UplinkProfile> {
        let d = self.defaults;
        let u = self.user;
        let pnic = |name: String| TeamingUplink {
            uplink_name: name,
            uplink_type: "PNIC".to_string(),
        };

        Ok(UplinkProfile {
            display_name: d.string("host_switch_profile_name")?,
            resource_type: UPLINK_PROFILE.to_string(),
            mtu: u.string("host_switch_mtu")?,
            teaming: Teaming {
                standby_list: Vec::new(),
                active_list: vec![
                    pnic(d.string("host_switch_uplink1_name")?),
                    pnic(d.string("host_switch_uplink2_name")?),
                ],
                policy: d.string("host_switch_teaming_policy")?,
            },
            transport_vlan: u.string("transport_vlan")?,
        })
    }

    fn transport_node_profile(&self, host_switch_id: &str) -> Result<TransportNodeProfile> {
        let d = self.defaults;
        let uplinks = self.uplink_count("host_number_of_uplinks", "Host")?;
        let display_name = d.string("host_tnp_display_name")?;

        let host_switch = HostSwitch {
            host_switch_name: None,
            host_switch_id: Some(host_switch_id.to_string()),
            host_switch_type: "VDS".to_string(),
            host_switch_mode: "STANDARD".to_string(),
            host_switch_profiles: vec![ProfileRef {
                name: d.string("host_default_host_switch_profile")?,
                kind: UPLINK_PROFILE.to_string(),
            }],
            pnics: Vec::new(),
            uplinks: Some(
                HOST_UPLINKS
                    .iter()
                    .take(uplinks as usize)
                    .map(|(vds, uplink)| VdsUplink {
                        vds_uplink_name: (*vds).to_string(),
                        uplink_name: (*uplink).to_string(),
                    })
                    .collect(),
            ),
            ip_assignment_spec: IpAssignmentSpec {
                resource_type: STATIC_IP_POOL.to_string(),
                ip_pool_name: d.string("ip_pool_2_name")?,
            },
            transport_zone_endpoints: vec![self.overlay_endpoint()?],
        };

        Ok(TransportNodeProfile {
            resource_type: "TransportNodeProfile".to_string(),
            display_name: display_name.clone(),
            host_switch_spec: HostSwitchSpec {
                resource_type: STANDARD_SPEC.to_string(),
                host_switches: vec![host_switch],
            },
            description: display_name,
        })
    }

    fn transport_node_collections(&self) -> Result<Vec<TransportNodeCollection>> {
        let compute_manager_name = self.defaults.string("compute_manager_name")?;
        let profile_name = self.defaults.string("host_tnp_display_name")?;

        let collections: Vec<_> = cluster_names(self.user.require("compute_clusters_for_prep")?)
            .map(|cluster| TransportNodeCollection {
                state: STATE_PRESENT.to_string(),
                display_name: format!("TNP_{cluster}"),
                description: format!("TNP_{cluster}"),
                resource_type: "TransportNodeCollection".to_string(),
                compute_manager_name: compute_manager_name.clone(),
                cluster_name: cluster.to_string(),
                transport_node_profile_name: profile_name.clone(),
            })
            .collect();

        if collections.is_empty() {
            warn!("compute_clusters_for_prep is empty, no clusters will be prepared");
        }
        Ok(collections)
    }

    fn overlay_endpoint(&self) -> Result<TransportZoneEndpoint> {
        Ok(TransportZoneEndpoint {
            transport_zone_name: self.defaults.string("overlay_tz_name")?,
        })
    }

    fn uplink_count(&self, key: &str, node: &str) -> Result<u32> {
        let configured = self.user.require_u32(key)?;
        if configured > MAX_UPLINKS {
            return Err(Error::UplinkLimit {
                node: node.to_string(),
                configured,
                max: MAX_UPLINKS,
            });
        }
        Ok(configured)
    }
}

/// Split a comma separated cluster list, trimming names and dropping blanks.
pub fn cluster_names(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|c| !c.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{templates, TemplateWriter};
    use pretty_assertions::assert_eq;

    const SWITCH_ID: &str = "50 2a 1b 3c 4d 5e 6f 70-81 92 a3 b4 c5 d6 e7 f8";

    fn defaults() -> ParamFile {
        let text = TemplateWriter::new().render(&templates::factory_defaults());
        ParamFile::parse("nsx-defaults.txt", &text).unwrap()
    }

    fn user(overrides: &[(&str, &str)]) -> ParamFile {
        let mut entries: Vec<(String, String)> = vec![
            ("nsx_ova_path", "/home/user/nsx_bits"),
            ("nsx_ova", "nsx-unified-appliance-3.0.ova"),
            ("nsx_manager_cluster", "yes"),
            ("nsx_password", "myPassword1!myPassword1!"),
            ("domain", "mylab.net"),
            ("netmask", "255.255.255.0"),
            ("gateway", "192.168.1.1"),
            ("dns_server", "8.8.8.8"),
            ("ntp_server", "216.239.35.0"),
            ("nsx_vcenter_fqdn", "vc-mgmt.mylab.net"),
            ("nsx_vcenter_username", "administrator@vsphere.local"),
            ("nsx_vcenter_password", "vcPass1!"),
            ("node1_hostname", "nsx1.mylab.net"),
            ("node1_mgmt_ip", "192.168.1.10"),
            ("node1_datacenter", "DC"),
            ("node1_cluster", "Mgmt-Cluster"),
            ("node1_datastore", "datastore5"),
            ("node1_portgroup", "VM Network"),
            ("node2_hostname", "nsx2.mylab.net"),
            ("node2_mgmt_ip", "192.168.1.20"),
            ("node2_netmask_prefix", "24"),
            ("node2_datacenter", "DC"),
            ("node2_cluster", "Mgmt-Cluster"),
            ("node2_datastore", "datastore6"),
            ("node2_portgroup", "VM Network"),
            ("node3_hostname", "nsx3.mylab.net"),
            ("node3_mgmt_ip", "192.168.1.30"),
            ("node3_netmask_prefix", "24"),
            ("node3_datacenter", "DC"),
            ("node3_cluster", "Mgmt-Cluster"),
            ("node3_datastore", "datastore5"),
            ("node3_portgroup", "VM Network"),
            ("vcenter_fqdn", "vc-compute.mylab.net"),
            ("vcenter_username", "administrator@vsphere.local"),
            ("vcenter_password", "computePass1!"),
            ("nsx_license_key", "XXXX-YYYY-ZZZZ-1111-2222"),
            ("ip_pool_1_start", "172.16.227.20"),
            ("ip_pool_1_end", "172.16.227.29"),
            ("ip_pool_1_gateway", "172.16.227.1"),
            ("ip_pool_1_cidr", "172.16.227.0/27"),
            ("ip_pool_2_start", "172.16.228.20"),
            ("ip_pool_2_end", "172.16.228.29"),
            ("ip_pool_2_gateway", "172.16.228.1"),
            ("ip_pool_2_cidr", "172.16.228.0/27"),
            ("Tier0_BGP_AS_Number", "65001"),
            ("host_switch_mtu", "1600"),
            ("transport_vlan", "0"),
            ("host_vds_name", "vds1"),
            ("host_number_of_uplinks", "2"),
            ("compute_clusters_for_prep", "Cluster-A, Cluster-B"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        for n in ["1", "2"] {
            for (field, value) in [
                ("host_switch_profile_name", "nsx-edge-single-nic-uplink-profile"),
                ("number_of_uplinks", "2"),
                ("cluster", "Edge-Cluster-Compute"),
                ("storage", "datastore7"),
                ("mgmt_network", "VM Network"),
                ("mgmt_ip", "192.168.1.5"),
                ("mgmt_netmask_prefix", "24"),
                ("default_gateway", "192.168.1.1"),
                ("fqdn", "edge.mylab.net"),
                ("data_network", "lab-dvpg"),
                ("system_password", "edgePass1!edgePass1!"),
            ] {
                let value = match field {
                    "mgmt_ip" => format!("{value}{n}"),
                    "fqdn" => format!("edge{n}.mylab.net"),
                    "data_network" => format!("{value}-{n}"),
                    _ => value.to_string(),
                };
                entries.push((format!("edge{n}_{field}"), value));
            }
        }

        for (key, value) in overrides {
            match entries.iter_mut().find(|(k, _)| k == key) {
                Some(entry) => entry.1 = (*value).to_string(),
                None => entries.push(((*key).to_string(), (*value).to_string())),
            }
        }

        let text: String = entries
            .iter()
            .map(|(k, v)| format!("{k} = \"{v}\"\n"))
            .collect();
        ParamFile::parse("nsx-config.txt", &text).unwrap()
    }

    fn build(overrides: &[(&str, &str)]) -> Result<VarsDocument> {
        let defaults = defaults();
        let user = user(overrides);
        VarsBuilder::new(&defaults, &user).build(SWITCH_ID)
    }

    #[test]
    fn test_top_level_scalars() {
        let doc = build(&[]).unwrap();
        assert_eq!(doc.state, "present");
        assert_eq!(doc.nsx_username, "admin");
        assert!(!doc.validate_certs);
        assert_eq!(doc.domain, "mylab.net");
        assert_eq!(doc.nsx_node1.hostname, "nsx1.mylab.net");
        assert_eq!(doc.nsxt_licenses[0].license_key, "XXXX-YYYY-ZZZZ-1111-2222");
    }

    #[test]
    fn test_cluster_deploys_additional_nodes() {
        let doc = build(&[]).unwrap();
        assert!(doc.is_manager_cluster());
        let hostnames: Vec<_> = doc.additional_nodes.iter().map(|n| n.hostname.as_str()).collect();
        assert_eq!(hostnames, ["nsx2.mylab.net", "nsx3.mylab.net"]);
        assert_eq!(doc.additional_nodes[0].prefix, 24);
        assert_eq!(doc.additional_nodes[1].vcenter, "vSphere_NSX_deploy");
        assert_eq!(doc.additional_nodes[1].vcenter_pass, "vcPass1!");
    }

    #[test]
    fn test_standalone_skips_additional_nodes() {
        let doc = build(&[("nsx_manager_cluster", "no")]).unwrap();
        assert!(doc.additional_nodes.is_empty());
        assert!(!doc.is_manager_cluster());
    }

    #[test]
    fn test_separate_vcenters_register_two_compute_managers() {
        let doc = build(&[]).unwrap();
        assert_eq!(doc.compute_managers.len(), 2);

        let primary = &doc.compute_managers[0];
        assert_eq!(primary.display_name, "vcenter");
        assert_eq!(primary.mgmt_ip, "vc-compute.mylab.net");
        assert!(primary.set_as_oidc_provider);

        let secondary = &doc.compute_managers[1];
        assert_eq!(secondary.display_name, "vSphere_NSX_deploy");
        assert_eq!(secondary.mgmt_ip, "vc-mgmt.mylab.net");
        assert_eq!(secondary.password, "vcPass1!");
        assert!(!secondary.set_as_oidc_provider);

        let vm = &doc.edge_transport_nodes[0]
            .node_deployment_info
            .deployment_config
            .vm_deployment_config;
        assert_eq!(vm.vc_name, "vSphere_NSX_deploy");
    }

    #[test]
    fn test_shared_vcenter_uses_compute_manager_name_everywhere() {
        let doc = build(&[("nsx_vcenter_fqdn", "vc-compute.mylab.net")]).unwrap();
        assert_eq!(doc.compute_managers.len(), 1);
        assert!(doc.additional_nodes.iter().all(|n| n.vcenter == "vcenter"));
        assert!(doc.edge_transport_nodes.iter().all(|e| {
            e.node_deployment_info
                .deployment_config
                .vm_deployment_config
                .vc_name
                == "vcenter"
        }));
    }

    #[test]
    fn test_ip_pools_and_transport_zones() {
        let doc = build(&[]).unwrap();
        let names: Vec<_> = doc.transport_zones.iter().map(|t| t.transport_type.as_str()).collect();
        assert_eq!(names, ["OVERLAY", "VLAN"]);

        assert_eq!(doc.ip_pools[0].display_name, "Edge-TEP-IP-Pool");
        let subnet = &doc.ip_pools[0].pool_static_subnets[0];
        assert_eq!(subnet.id, "Edge-TEP-IP-Pool_subnets");
        assert_eq!(subnet.allocation_ranges[0].start, "172.16.227.20");
        assert_eq!(subnet.cidr, "172.16.227.0/27");
        assert_eq!(doc.ip_pools[1].pool_static_subnets[0].gateway_ip, "172.16.228.1");
    }

    #[test]
    fn test_edge_uplinks_leave_one_for_management() {
        let doc = build(&[("edge2_number_of_uplinks", "1")]).unwrap();

        let edge1 = &doc.edge_transport_nodes[0].host_switch_spec.host_switches[0];
        assert_eq!(
            edge1.pnics,
            vec![Pnic {
                device_name: "fp-eth0".to_string(),
                uplink_name: "uplink-1".to_string(),
            }]
        );
        assert!(edge1.uplinks.is_none());

        let edge2 = &doc.edge_transport_nodes[1].host_switch_spec.host_switches[0];
        assert!(edge2.pnics.is_empty());
    }

    #[test]
    fn test_edge_uplink_limit() {
        let err = build(&[("edge1_number_of_uplinks", "3")]).unwrap_err();
        assert_eq!(err.to_string(), "Max allowed Edge Uplinks: 2. Configured: 3");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_edge_uses_its_own_data_network() {
        let doc = build(&[]).unwrap();
        let nets: Vec<_> = doc
            .edge_transport_nodes
            .iter()
            .map(|e| {
                e.node_deployment_info.deployment_config.vm_deployment_config.data_networks[0]
                    .clone()
            })
            .collect();
        assert_eq!(nets, ["lab-dvpg-1", "lab-dvpg-2"]);
    }

    #[test]
    fn test_edge_deployment_details() {
        let doc = build(&[]).unwrap();
        let edge = &doc.edge_transport_nodes[1];
        assert_eq!(edge.display_name, "edge-02");
        assert_eq!(edge.resource_type, "TransportNode");

        let info = &edge.node_deployment_info;
        assert_eq!(info.display_name, "edge-02");
        assert_eq!(info.node_settings.hostname, "edge2.mylab.net");
        assert_eq!(info.deployment_config.form_factor, "LARGE");

        let users = &info.deployment_config.node_user_settings;
        assert_eq!(users.cli_username, "admin");
        assert_eq!(users.audit_username, "audit");
        assert_eq!(users.root_password, "edgePass1!edgePass1!");

        let subnet = &info.deployment_config.vm_deployment_config.management_port_subnets[0];
        assert_eq!(subnet.ip_addresses, ["192.168.1.52"]);
        assert_eq!(subnet.prefix_length, 24);
    }

    #[test]
    fn test_bad_edge_prefix_rejected() {
        let err = build(&[("edge1_mgmt_netmask_prefix", "255.255.255.0")]).unwrap_err();
        assert!(matches!(err, Error::InvalidParam { ref key, .. } if key == "edge1_mgmt_netmask_prefix"));
    }

    #[test]
    fn test_tier0_bgp_as() {
        let doc = build(&[]).unwrap();
        let service = &doc.tier0_gateways[0].locale_services[0];
        assert_eq!(service.id, "vSphereK8sT0_service");
        assert_eq!(service.bgp.local_as_num, "65001");
        assert_eq!(service.edge_cluster_info.edge_cluster_display_name, "Edge-Cluster");

        let doc = build(&[("Tier0_BGP_AS_Number", "")]).unwrap();
        assert_eq!(
            doc.tier0_gateways[0].locale_services[0].bgp.local_as_num,
            DEFAULT_LOCAL_AS
        );

        assert!(build(&[("Tier0_BGP_AS_Number", "AS65001")]).is_err());
    }

    #[test]
    fn test_edge_cluster_members() {
        let doc = build(&[]).unwrap();
        let cluster = &doc.edge_clusters[0];
        assert_eq!(
            cluster.cluster_profile_bindings[0].profile_name,
            "nsx-default-edge-high-availability-profile"
        );
        let members: Vec<_> = cluster
            .members
            .iter()
            .map(|m| m.transport_node_name.as_str())
            .collect();
        assert_eq!(members, ["edge-01", "edge-02"]);
    }

    #[test]
    fn test_host_profile_and_tnp() {
        let doc = build(&[("host_number_of_uplinks", "1")]).unwrap();

        let profile = &doc.host_switch_profiles[0];
        assert_eq!(profile.mtu, "1600");
        assert_eq!(profile.teaming.policy, "FAILOVER_ORDER");
        assert_eq!(profile.teaming.active_list.len(), 2);
        assert!(profile.teaming.standby_list.is_empty());

        let tnp = &doc.transport_node_profiles[0];
        assert_eq!(tnp.description, tnp.display_name);
        let switch = &tnp.host_switch_spec.host_switches[0];
        assert_eq!(switch.host_switch_id.as_deref(), Some(SWITCH_ID));
        assert_eq!(switch.host_switch_type, "VDS");
        assert_eq!(
            switch.uplinks,
            Some(vec![VdsUplink {
                vds_uplink_name: "Uplink 1".to_string(),
                uplink_name: "uplink-1".to_string(),
            }])
        );
        assert_eq!(switch.ip_assignment_spec.ip_pool_name, "Host-TEP-IP-Pool");
    }

    #[test]
    fn test_host_uplink_limit() {
        let err = build(&[("host_number_of_uplinks", "4")]).unwrap_err();
        assert_eq!(err.to_string(), "Max allowed Host Uplinks: 2. Configured: 4");
    }

    #[test]
    fn test_cluster_list_expansion() {
        let doc = build(&[("compute_clusters_for_prep", " Cluster-A,Cluster-B , ,Cluster-C,")]).unwrap();
        let names: Vec<_> = doc
            .transport_node_collections
            .iter()
            .map(|c| c.display_name.as_str())
            .collect();
        assert_eq!(names, ["TNP_Cluster-A", "TNP_Cluster-B", "TNP_Cluster-C"]);

        let first = &doc.transport_node_collections[0];
        assert_eq!(first.cluster_name, "Cluster-A");
        assert_eq!(first.compute_manager_name, "vcenter");
        assert_eq!(first.transport_node_profile_name, "vSphereK8_TNP");
    }

    #[test]
    fn test_missing_key_is_reported() {
        let defaults = defaults();
        let user = ParamFile::parse("nsx-config.txt", "nsx_password = \"x\"").unwrap();
        let err = VarsBuilder::new(&defaults, &user).build(SWITCH_ID).unwrap_err();
        assert!(matches!(err, Error::MissingParam { ref file, .. } if file == "nsx-config.txt"));
    }

    #[test]
    fn test_validate_needs_no_switch() {
        let defaults = defaults();
        let good = user(&[]);
        assert!(VarsBuilder::new(&defaults, &good).validate().is_ok());

        let bad = user(&[("edge1_number_of_uplinks", "3")]);
        let err = VarsBuilder::new(&defaults, &bad).validate().unwrap_err();
        assert_eq!(err.to_string(), "Max allowed Edge Uplinks: 2. Configured: 3");

        let missing = ParamFile::parse("nsx-config.txt", "nsx_password = \"x\"").unwrap();
        assert!(matches!(
            VarsBuilder::new(&defaults, &missing).validate(),
            Err(Error::MissingParam { .. })
        ));
    }

    #[test]
    fn test_build_is_deterministic() {
        let a = build(&[]).unwrap().render(VarsFormat::Json).unwrap();
        let b = build(&[]).unwrap().render(VarsFormat::Json).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_json_layout() {
        let doc = build(&[]).unwrap();
        let json = doc.render(VarsFormat::Json).unwrap();
        assert!(json.starts_with("{\n  \"state\": \"present\",\n  \"nsx_username\": \"admin\""));
        assert!(json.contains("\"BGP\": {"));
        assert!(json.contains("\"type\": \"UplinkHostSwitchProfile\""));
        // Edge switches are named, host switches are identified by UUID.
        assert!(!json.contains("\"host_switch_name\": null"));

        let back: VarsDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_yaml_layout() {
        let doc = build(&[]).unwrap();
        let yaml = doc.render(VarsFormat::Yaml).unwrap();
        assert!(yaml.starts_with("state: present\n"));
        let back: VarsDocument = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_cluster_names_helper() {
        assert_eq!(cluster_names("").count(), 0);
        assert_eq!(cluster_names("A").collect::<Vec<_>>(), ["A"]);
    }
}
