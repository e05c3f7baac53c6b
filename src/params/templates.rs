//! Factory defaults and user configuration templates.

/// A single line item in a parameter template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateItem {
    /// Ruled section header
    Section(&'static str),
    /// Annotated key-value entry
    Entry {
        key: &'static str,
        value: &'static str,
        comment: &'static str,
        example: Option<&'static str>,
    },
}

/// An ordered, titled parameter template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    /// Title comment at the top of the file
    pub title: &'static str,
    /// Sections and entries in output order
    pub items: Vec<TemplateItem>,
}

impl Template {
    fn new(title: &'static str) -> Self {
        Self {
            title,
            items: Vec::new(),
        }
    }

    fn section(mut self, title: &'static str) -> Self {
        self.items.push(TemplateItem::Section(title));
        self
    }

    fn entry(self, key: &'static str, value: &'static str, comment: &'static str) -> Self {
        self.push_entry(key, value, comment, None)
    }

    fn example(
        self,
        key: &'static str,
        value: &'static str,
        comment: &'static str,
        example: &'static str,
    ) -> Self {
        self.push_entry(key, value, comment, Some(example))
    }

    fn push_entry(
        mut self,
        key: &'static str,
        value: &'static str,
        comment: &'static str,
        example: Option<&'static str>,
    ) -> Self {
        self.items.push(TemplateItem::Entry {
            key,
            value,
            comment,
            example,
        });
        self
    }

    /// Keys defined by this template, in order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.items.iter().filter_map(|item| match item {
            TemplateItem::Entry { key, .. } => Some(*key),
            TemplateItem::Section(_) => None,
        })
    }
}

macro_rules! manager_keys {
    ($n:literal, $title:literal, $ordinal:literal, $ip:literal, $datastore:literal) => {
        ManagerKeys {
            section: concat!($title, " NSX Manager deployment details"),
            hostname: concat!("node", $n, "_hostname"),
            hostname_comment: concat!("FQDN of the ", $ordinal, " NSX Manager node"),
            hostname_example: concat!("nsx", $n, ".mylab.net"),
            mgmt_ip: concat!("node", $n, "_mgmt_ip"),
            mgmt_ip_comment: concat!(
                "Management IP Address to be configured on the ",
                $ordinal,
                " NSX Manager"
            ),
            mgmt_ip_example: $ip,
            netmask_prefix: concat!("node", $n, "_netmask_prefix"),
            netmask_prefix_comment: concat!("Network prefix for the ", $ordinal, " NSX Manager"),
            datacenter: concat!("node", $n, "_datacenter"),
            datacenter_comment: concat!(
                "vCenter Datacenter name where the ",
                $ordinal,
                " NSX Manager will be deployed"
            ),
            cluster: concat!("node", $n, "_cluster"),
            cluster_comment: concat!(
                "vCenter Cluster name where the ",
                $ordinal,
                " NSX Manager will be deployed"
            ),
            datastore: concat!("node", $n, "_datastore"),
            datastore_comment: concat!(
                "vCenter Datastore where the ",
                $ordinal,
                " NSX Manager will be deployed"
            ),
            datastore_example: $datastore,
            portgroup: concat!("node", $n, "_portgroup"),
            portgroup_comment: concat!(
                "vCenter Network for the management interface of the ",
                $ordinal,
                " NSX Manager. This can be a standard portgroup or a distributed port group"
            ),
        }
    };
}

macro_rules! edge_keys {
    ($n:literal) => {
        EdgeKeys {
            section: concat!("Edge ", $n, " deployment details"),
            host_switch_profile_name: concat!("edge", $n, "_host_switch_profile_name"),
            profile_comment: concat!("Host Switch Profile to be used on Edge", $n),
            number_of_uplinks: concat!("edge", $n, "_number_of_uplinks"),
            cluster: concat!("edge", $n, "_cluster"),
            cluster_comment: concat!("vCenter Cluster name where Edge", $n, " will be deployed"),
            storage: concat!("edge", $n, "_storage"),
            storage_comment: concat!("Datastore name where Edge", $n, " will be deployed"),
            mgmt_network: concat!("edge", $n, "_mgmt_network"),
            mgmt_network_comment: concat!("Port Group backing for the Management Cluster of Edge", $n),
            mgmt_ip: concat!("edge", $n, "_mgmt_ip"),
            mgmt_ip_comment: concat!("Management IP Address for Edge", $n),
            mgmt_netmask_prefix: concat!("edge", $n, "_mgmt_netmask_prefix"),
            default_gateway: concat!("edge", $n, "_default_gateway"),
            default_gateway_comment: concat!(
                "Default Gateway to be configured on Edge",
                $n,
                " Management Network"
            ),
            fqdn: concat!("edge", $n, "_fqdn"),
            fqdn_comment: concat!("FQDN of Edge", $n),
            data_network: concat!("edge", $n, "_data_network"),
            data_network_comment: concat!("Port Group backing for the data network on Edge", $n),
            system_password: concat!("edge", $n, "_system_password"),
            system_password_comment: concat!(
                "Edge",
                $n,
                " CLI, root and audit user account passwords. The same password will be configured for all 3."
            ),
        }
    };
}

/// Factory default settings.
pub fn factory_defaults() -> Template {
    Template::new("Defaults")
        .entry("nsx_username", "admin", "NSX Username")
        .entry("validate_certs", "false", "Accept self-signed certs")
        .entry(
            "nsx_vcenter",
            "vSphere_NSX_deploy",
            "Display name of vCenter on which NSX will be deployed",
        )
        .entry(
            "compute_manager_name",
            "vcenter",
            "Display Name on NSX Manager for the registered vCenter Server",
        )
        .entry("overlay_tz_name", "Overlay-TZ", "Overlay Transport Zone display name")
        .entry("vlan_tz_name", "VLAN-TZ", "VLAN Transport Zone display name")
        .entry("ip_pool_1_name", "Edge-TEP-IP-Pool", "IP Pool used by Edge Transport Nodes")
        .entry("ip_pool_2_name", "Host-TEP-IP-Pool", "IP Pool used by Host Transport Nodes.")
        .entry(
            "edge_form_factor",
            "LARGE",
            "VM form factor for Edge Node deployments. Defaults to LARGE. Other choices are SMALL and MEDIUM",
        )
        .entry("edge1_host_switch_name", "nvds1", "Host Switch Name on Edge1")
        .entry("edge1_display_name", "edge-01", "Display Name of Edge1 on NSX Manager")
        .entry("edge2_host_switch_name", "nvds1", "Host Switch Name on Edge2")
        .entry("edge2_display_name", "edge-02", "Display Name of Edge2 on NSX Manager")
        .entry("edge_cluster_display_name", "Edge-Cluster", "Display name of the Edge Cluster")
        .entry(
            "edge_cluster_profile_binding",
            "nsx-default-edge-high-availability-profile",
            "Edge Cluster Profile Binding",
        )
        .entry("tier0_display_name", "vSphereK8sT0", "Tier0 display name")
        .entry(
            "host_switch_profile_name",
            "vSphereK8_uplink_profile",
            "Name of the Host Switch Uplink Profile",
        )
        .entry("host_switch_uplink1_name", "uplink-1", "Uplink1 Name used for Host switch teaming")
        .entry("host_switch_uplink2_name", "uplink-2", "Uplink2 Name used for Host switch teaming")
        .entry(
            "host_switch_teaming_policy",
            "FAILOVER_ORDER",
            "Teaming policy. Choices are FAILOVER_ORDER, LOADBALANCE_SRCID or LOADBALANCE_SRC_MAC",
        )
        .entry(
            "host_tnp_display_name",
            "vSphereK8_TNP",
            "Name of the Transport Node Profile configured on the Compute Clusters",
        )
        .entry(
            "host_default_host_switch_profile",
            "nsx-default-uplink-hostswitch-profile",
            "Host Switch Profile used for Host Transport Node config",
        )
}

/// Blank user configuration with examples.
pub fn user_config() -> Template {
    let template = Template::new("User Configuration")
        .section("NSX OVA details")
        .example(
            "nsx_ova_path",
            "",
            "Path where NSX OVA can be found on the local system",
            "/home/user/nsx_bits",
        )
        .example("nsx_ova", "", "NSX OVA file name", "nsx-unified-appliance-3.0.ova")
        .section("NSX Manager Cluster or Standalone deployment")
        .entry(
            "nsx_manager_cluster",
            "yes",
            "Deploy NSX Manager 3 node cluster. To deploy just 1 node, change to 'no'",
        )
        .section("Details applicable to all 3 NSX nodes")
        .example(
            "nsx_password",
            "",
            "Password for admin and root accounts",
            "myPassword1!myPassword1!",
        )
        .example("domain", "", "Domain name for NSX Manager cluster", "mylab.net")
        .example("netmask", "", "NSX Manager network netmask", "255.255.255.224")
        .example("gateway", "", "Gateway to be configured on NSX Manager", "192.168.1.1")
        .example("dns_server", "", "DNS Server to be configured on NSX Manager", "8.8.8.8")
        .example("ntp_server", "", "NTP Server to be configured on NSX Manager", "216.239.35.0")
        .example(
            "nsx_vcenter_fqdn",
            "",
            "vCenter where NSX Manager and Edges will be deployed",
            "10.10.10.2",
        )
        .example(
            "nsx_vcenter_username",
            "",
            "vCenter Username for NSX deployment",
            "administrator@vsphere.local",
        )
        .example(
            "nsx_vcenter_password",
            "",
            "vCenter Password for NSX deployment",
            "myPassword1!",
        )
        .section("First NSX Manager node deployment details")
        .example("node1_hostname", "", "FQDN of the first NSX Manager", "nsx1.mylab.net")
        .example(
            "node1_mgmt_ip",
            "",
            "IP Address to be configured on the first NSX Manager",
            "192.168.1.10",
        )
        .example(
            "node1_datacenter",
            "",
            "vCenter Datacenter name where NSX Manager will be deployed",
            "Palo-Alto-Datacenter",
        )
        .example(
            "node1_cluster",
            "",
            "vCenter Cluster name where NSX Manager will be deployed",
            "Mgmt-Cluster",
        )
        .example(
            "node1_datastore",
            "",
            "vCenter Datastore where NSX Manager will be deployed",
            "datastore5",
        )
        .example(
            "node1_portgroup",
            "",
            "vCenter Network for the management interface of NSX Manager. This can be a standard portgroup or a distributed port group",
            "VM Network",
        );

    let template = manager_node(
        template,
        manager_keys!("2", "Second", "second", "192.168.1.20", "datastore6"),
    );
    let template = manager_node(
        template,
        manager_keys!("3", "Third", "third", "192.168.1.30", "datastore5"),
    );

    let template = template
        .section("vCenter to be registered as Compute Manager")
        .example(
            "vcenter_fqdn",
            "",
            "FQDN or IP of the vCenter Server to be registered with NSX Manager",
            "vcenter.mylab.net",
        )
        .example(
            "vcenter_username",
            "",
            "vCenter username for authentication",
            "administrator@vsphere.local",
        )
        .example("vcenter_password", "", "vCenter password for authentication", "myPassword1!")
        .section("NSX License key")
        .example(
            "nsx_license_key",
            "",
            "NSX License Key",
            "XXXX-YYYY-ZZZZ-1111-2222-3333-4444",
        )
        .section("TEP IP Pool for the Edge")
        .example(
            "ip_pool_1_start",
            "",
            "Start address of the Edge TEP IP Pool range",
            "172.16.227.20",
        )
        .example("ip_pool_1_end", "", "End address of the TEP IP Pool range", "172.16.227.29")
        .example("ip_pool_1_gateway", "", "Gateway for the TEP IP Pool", "172.16.227.1")
        .example(
            "ip_pool_1_cidr",
            "",
            "TEP IP Pool Netmask in CIDR format",
            "172.16.227.0/27",
        )
        .section("TEP IP Pool for Host Nodes")
        .example(
            "ip_pool_2_start",
            "",
            "Start address of the Host TEP IP Pool range",
            "172.16.228.20",
        )
        .example(
            "ip_pool_2_end",
            "",
            "End address of the Host TEP IP Pool range",
            "172.16.228.29",
        )
        .example("ip_pool_2_gateway", "", "Gateway for the Host TEP IP Pool", "172.16.228.1")
        .example(
            "ip_pool_2_cidr",
            "",
            "Host TEP IP Pool Netmask in CIDR format",
            "172.16.228.0/27",
        );

    let template = edge_node(template, edge_keys!("1"), "192.168.1.50", "edge1.mylab.net");
    let template = edge_node(template, edge_keys!("2"), "192.168.1.51", "edge2.mylab.net");

    template
        .section("Tier0 Gateway Config")
        .example(
            "Tier0_BGP_AS_Number",
            "",
            "BGP AS number to be configured on the Tier0 Gateway",
            "1211",
        )
        .section("Host Switch Profile Settings")
        .example("host_switch_mtu", "", "MTU used for uplinks", "1600")
        .example(
            "transport_vlan",
            "",
            "VLAN used for tagging Overlay traffic of associated HostSwitch",
            "0",
        )
        .section("Host Transport Node Profile configurations")
        .example("host_vds_name", "", "VDS Name on vCenter server", "vds1")
        .example(
            "host_number_of_uplinks",
            "2",
            "Number of Uplinks on the Host Node. Max: 2",
            "2",
        )
        .section("Compute Clusters to be Configured with NSX")
        .example(
            "compute_clusters_for_prep",
            "",
            "Comma separated vSphere Compute Clusters to be Configured with NSX",
            "Cluster-A, Cluster-B, Cluster-C",
        )
}

fn manager_node(template: Template, keys: ManagerKeys) -> Template {
    template
        .section(keys.section)
        .example(keys.hostname, "", keys.hostname_comment, keys.hostname_example)
        .example(keys.mgmt_ip, "", keys.mgmt_ip_comment, keys.mgmt_ip_example)
        .example(keys.netmask_prefix, "", keys.netmask_prefix_comment, "24")
        .example(
            keys.datacenter,
            "",
            keys.datacenter_comment,
            "Palo-Alto-Datacenter",
        )
        .example(keys.cluster, "", keys.cluster_comment, "Mgmt-Cluster")
        .example(keys.datastore, "", keys.datastore_comment, keys.datastore_example)
        .example(keys.portgroup, "", keys.portgroup_comment, "VM Network")
}

/// Key and comment names for one secondary manager node block.
struct ManagerKeys {
    section: &'static str,
    hostname: &'static str,
    hostname_comment: &'static str,
    hostname_example: &'static str,
    mgmt_ip: &'static str,
    mgmt_ip_comment: &'static str,
    mgmt_ip_example: &'static str,
    netmask_prefix: &'static str,
    netmask_prefix_comment: &'static str,
    datacenter: &'static str,
    datacenter_comment: &'static str,
    cluster: &'static str,
    cluster_comment: &'static str,
    datastore: &'static str,
    datastore_comment: &'static str,
    datastore_example: &'static str,
    portgroup: &'static str,
    portgroup_comment: &'static str,
}

fn edge_node(template: Template, keys: EdgeKeys, ip: &'static str, fqdn: &'static str) -> Template {
    template
        .section(keys.section)
        .example(
            keys.host_switch_profile_name,
            "",
            keys.profile_comment,
            "nsx-edge-single-nic-uplink-profile",
        )
        .example(
            keys.number_of_uplinks,
            "2",
            "Number of Uplinks on the Edge Node. Max: 2",
            "2",
        )
        .example(keys.cluster, "", keys.cluster_comment, "Management")
        .entry(keys.storage, "", keys.storage_comment)
        .example(keys.mgmt_network, "", keys.mgmt_network_comment, "VM Network")
        .example(keys.mgmt_ip, "", keys.mgmt_ip_comment, ip)
        .example(
            keys.mgmt_netmask_prefix,
            "",
            "Network prefix on the Management Network",
            "24",
        )
        .example(keys.default_gateway, "", keys.default_gateway_comment, "192.168.1.1")
        .example(keys.fqdn, "", keys.fqdn_comment, fqdn)
        .example(keys.data_network, "", keys.data_network_comment, "lab-dvpg")
        .example(
            keys.system_password,
            "",
            keys.system_password_comment,
            "myPassword1!myPassword1!",
        )
}

/// Key and comment names for one edge node block.
struct EdgeKeys {
    section: &'static str,
    host_switch_profile_name: &'static str,
    profile_comment: &'static str,
    number_of_uplinks: &'static str,
    cluster: &'static str,
    cluster_comment: &'static str,
    storage: &'static str,
    storage_comment: &'static str,
    mgmt_network: &'static str,
    mgmt_network_comment: &'static str,
    mgmt_ip: &'static str,
    mgmt_ip_comment: &'static str,
    mgmt_netmask_prefix: &'static str,
    default_gateway: &'static str,
    default_gateway_comment: &'static str,
    fqdn: &'static str,
    fqdn_comment: &'static str,
    data_network: &'static str,
    data_network_comment: &'static str,
    system_password: &'static str,
    system_password_comment: &'static str,
}
