//! Variables document tests driven by the on-disk parameter files
//!
//! These tests cover:
//! - Building from the factory defaults and a filled-in user config
//! - The written JSON and YAML files
//! - Switch resolution through the `SwitchLookup` seam

mod common;

use async_trait::async_trait;
use common::*;
use nsx_install::error::{Error, Result};
use nsx_install::vars::{VarsBuilder, VarsDocument, VarsFormat};
use nsx_install::vsphere::SwitchLookup;
use pretty_assertions::assert_eq;
use serde_json::Value;

const SWITCH_ID: &str = "50 1d 8e 3c 9f 12 4a 6b-8c 77 2e 41 d0 93 15 aa";

/// Resolves every switch to the same UUID.
struct FixedLookup;

#[async_trait]
impl SwitchLookup for FixedLookup {
    async fn switch_uuid(&self, name: &str) -> Result<String> {
        if name == "Compute-VDS" {
            Ok(SWITCH_ID.to_string())
        } else {
            Err(Error::SwitchNotFound {
                name: name.to_string(),
            })
        }
    }
}

fn build(ws: &Workspace) -> Result<VarsDocument> {
    let defaults = ws.defaults();
    let user = ws.user();
    VarsBuilder::new(&defaults, &user).build(SWITCH_ID)
}

fn as_json(doc: &VarsDocument) -> Value {
    serde_json::from_str(&doc.render(VarsFormat::Json).unwrap()).unwrap()
}

#[test]
fn test_fixture_document() {
    let ws = Workspace::new();
    let json = as_json(&build(&ws).unwrap());

    assert_eq!(json["nsx_vcenter_fqdn"], "vcsa-mgmt.corp.local");
    assert_eq!(json["validate_certs"], false);
    assert_eq!(json["nsx_node1"]["portgroup"], "Mgmt-PG");
    assert_eq!(json["additional_nodes"].as_array().unwrap().len(), 2);
    assert_eq!(json["additional_nodes"][0]["prefix"], 24);
    assert_eq!(json["compute_managers"][0]["mgmt_ip"], "vcsa-comp.corp.local");
    assert_eq!(json["compute_managers"][1]["mgmt_ip"], "vcsa-mgmt.corp.local");
    assert_eq!(
        json.pointer("/ip_pools/1/pool_static_subnets/0/allocation_ranges/0/end"),
        Some(&Value::from("172.16.20.50"))
    );
    assert_eq!(
        json.pointer("/tier0_gateways/0/locale_services/0/BGP/local_as_num"),
        Some(&Value::from("65010"))
    );
    assert_eq!(json["host_switch_profiles"][0]["mtu"], "1700");
    assert_eq!(json["host_switch_profiles"][0]["transport_vlan"], "120");
}

#[test]
fn test_fixture_edges() {
    let ws = Workspace::new();
    let json = as_json(&build(&ws).unwrap());

    for (i, (ip, network)) in [("10.10.10.31", "Edge-Trunk-A"), ("10.10.10.32", "Edge-Trunk-B")]
        .iter()
        .enumerate()
    {
        let vm = json
            .pointer(&format!(
                "/edge_transport_nodes/{i}/node_deployment_info/deployment_config/vm_deployment_config"
            ))
            .unwrap();
        assert_eq!(vm["management_port_subnets"][0]["ip_addresses"][0], *ip);
        assert_eq!(vm["data_networks"], serde_json::json!([network]));
        assert_eq!(vm["compute"], "Edge-Cluster-01");
    }

    let pnics = json
        .pointer("/edge_transport_nodes/0/host_switch_spec/host_switches/0/pnics")
        .unwrap();
    assert_eq!(
        pnics,
        &serde_json::json!([{"device_name": "fp-eth0", "uplink_name": "uplink-1"}])
    );
}

#[test]
fn test_fixture_host_preparation() {
    let ws = Workspace::new();
    let doc = build(&ws).unwrap();

    let switch = &doc.transport_node_profiles[0].host_switch_spec.host_switches[0];
    assert_eq!(switch.host_switch_id.as_deref(), Some(SWITCH_ID));
    assert!(switch.host_switch_name.is_none());

    let clusters: Vec<_> = doc
        .transport_node_collections
        .iter()
        .map(|c| (c.display_name.as_str(), c.cluster_name.as_str()))
        .collect();
    assert_eq!(
        clusters,
        [("TNP_Workload-01", "Workload-01"), ("TNP_Workload-02", "Workload-02")]
    );
}

#[test]
fn test_standalone_manager() {
    let ws = Workspace::new();
    ws.set("nsx_manager_cluster", "no");
    let doc = build(&ws).unwrap();
    assert!(!doc.is_manager_cluster());
    assert_eq!(as_json(&doc)["additional_nodes"], serde_json::json!([]));
}

#[test]
fn test_cluster_flag_accepts_y() {
    let ws = Workspace::new();
    ws.set("nsx_manager_cluster", "Y");
    assert!(build(&ws).unwrap().is_manager_cluster());
}

#[test]
fn test_shared_vcenter() {
    let ws = Workspace::new();
    ws.set("nsx_vcenter_fqdn", "vcsa-comp.corp.local");
    let doc = build(&ws).unwrap();
    assert_eq!(doc.compute_managers.len(), 1);
    assert_eq!(doc.additional_nodes[0].vcenter, doc.compute_managers[0].display_name);
}

#[test]
fn test_empty_bgp_as_falls_back() {
    let ws = Workspace::new();
    ws.set("Tier0_BGP_AS_Number", "");
    let doc = build(&ws).unwrap();
    assert_eq!(doc.tier0_gateways[0].locale_services[0].bgp.local_as_num, "1121");
}

#[test]
fn test_uplink_limit_from_file() {
    let ws = Workspace::new();
    ws.set("edge2_number_of_uplinks", "5");
    let err = build(&ws).unwrap_err();
    assert_eq!(err.to_string(), "Max allowed Edge Uplinks: 2. Configured: 5");
}

#[test]
fn test_missing_user_key() {
    let ws = Workspace::new();
    let content = std::fs::read_to_string(ws.join("nsx-config.txt")).unwrap();
    let trimmed: String = content
        .lines()
        .filter(|l| !l.starts_with("transport_vlan"))
        .map(|l| format!("{l}\n"))
        .collect();
    std::fs::write(ws.join("nsx-config.txt"), trimmed).unwrap();

    let err = build(&ws).unwrap_err();
    assert!(matches!(err, Error::MissingParam { ref key, .. } if key == "transport_vlan"));
}

#[test]
fn test_written_json_file() {
    let ws = Workspace::new();
    let doc = build(&ws).unwrap();
    let path = ws.join("nsx_pacific_vars.yml");
    doc.write(&path, VarsFormat::Json).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("{\n  \"state\": \"present\""));
    assert!(content.ends_with("}\n"));

    // The playbooks load the file as YAML, which JSON is a subset of.
    let as_yaml: VarsDocument = serde_yaml::from_str(&content).unwrap();
    assert_eq!(as_yaml, doc);
}

#[test]
fn test_written_yaml_file_replaces_previous() {
    let ws = Workspace::new();
    let path = ws.join("nsx_pacific_vars.yml");
    std::fs::write(&path, "stale: true\n").unwrap();

    let doc = build(&ws).unwrap();
    doc.write(&path, VarsFormat::Yaml).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(!content.contains("stale"));
    let back: VarsDocument = serde_yaml::from_str(&content).unwrap();
    assert_eq!(back, doc);
}

#[cfg(unix)]
#[test]
fn test_written_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let ws = Workspace::new();
    let fresh = ws.join("fresh.yml");
    let existing = ws.join("nsx_pacific_vars.yml");
    std::fs::write(&existing, "stale: true\n").unwrap();
    std::fs::set_permissions(&existing, std::fs::Permissions::from_mode(0o644)).unwrap();

    let doc = build(&ws).unwrap();
    doc.write(&fresh, VarsFormat::Json).unwrap();
    doc.write(&existing, VarsFormat::Json).unwrap();

    for path in [fresh, existing] {
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600, "{}", path.display());
    }
}

#[tokio::test]
async fn test_build_with_resolved_switch() {
    let ws = Workspace::new();
    let user = ws.user();
    let lookup: &dyn SwitchLookup = &FixedLookup;

    let switch_id = lookup
        .switch_uuid(user.require("host_vds_name").unwrap())
        .await
        .unwrap();
    let defaults = ws.defaults();
    let doc = VarsBuilder::new(&defaults, &user).build(&switch_id).unwrap();
    assert_eq!(
        doc.transport_node_profiles[0].host_switch_spec.host_switches[0]
            .host_switch_id
            .as_deref(),
        Some(SWITCH_ID)
    );

    ws.set("host_vds_name", "Other-VDS");
    let user = ws.user();
    let err = lookup
        .switch_uuid(user.require("host_vds_name").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SwitchNotFound { .. }));
}
