//! Shared test utilities for the nsx-install test suite.
//!
//! This module provides:
//! - A workspace with the factory defaults and a filled-in user config
//! - A mock vCenter answering the distributed switch lookup
//!
//! # Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::*;
//! ```

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use nsx_install::params::{templates, write_template, ParamFile};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const RELEASE: &str = "8.0.1.0";
pub const SESSION: &str = "52f7a3c1-session";
pub const VIEW_ID: &str = "session-52f7a3c1-view-1";
pub const SWITCH_UUID: &str = "50 1d 8e 3c 9f 12 4a 6b-8c 77 2e 41 d0 93 15 aa";

/// Path of a file in `tests/fixtures`.
pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// A temporary directory holding `nsx-defaults.txt` and `nsx-config.txt`.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    /// Factory defaults plus the fixture user config.
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        write_template(dir.path().join("nsx-defaults.txt"), &templates::factory_defaults())
            .unwrap();
        std::fs::copy(fixture("nsx-config.txt"), dir.path().join("nsx-config.txt")).unwrap();
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Replace `key`'s value in the user config.
    pub fn set(&self, key: &str, value: &str) {
        let file = self.join("nsx-config.txt");
        let content = std::fs::read_to_string(&file).unwrap();
        let prefix = format!("{key} = ");
        let updated: Vec<String> = content
            .lines()
            .map(|line| {
                if line.starts_with(&prefix) {
                    format!("{key} = \"{value}\"")
                } else {
                    line.to_string()
                }
            })
            .collect();
        std::fs::write(&file, updated.join("\n")).unwrap();
    }

    pub fn defaults(&self) -> ParamFile {
        ParamFile::load(self.join("nsx-defaults.txt")).unwrap()
    }

    pub fn user(&self) -> ParamFile {
        ParamFile::load(self.join("nsx-config.txt")).unwrap()
    }

    /// Write an `nsx-install.toml` pointing at `vcenter` with no settle wait.
    pub fn write_tool_config(&self, vcenter: &str) -> PathBuf {
        let file = self.join("nsx-install.toml");
        std::fs::write(
            &file,
            format!(
                "[paths]\ndefaults_file = \"{dir}/nsx-defaults.txt\"\nconfig_file = \"{dir}/nsx-config.txt\"\nlog_file = \"{dir}/nsx-install.log\"\nplaybook_dir = \"{dir}\"\n\n[ansible]\nsettle_secs = 0\n\n[vsphere]\nurl = \"{vcenter}\"\ntimeout_secs = 5\n",
                dir = self.path().display(),
            ),
        )
        .unwrap();
        file
    }
}

fn api(rest: &str) -> String {
    format!("/sdk/vim25/{RELEASE}/{rest}")
}

/// Mount the login and logout endpoints.
pub async fn mount_session(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(api("SessionManager/SessionManager/Login")))
        .and(body_partial_json(json!({"userName": "administrator@vsphere.local"})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("vmware-api-session-id", SESSION)
                .set_body_json(json!({"_typeName": "UserSession", "userName": "administrator@vsphere.local"})),
        )
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(api("SessionManager/SessionManager/Logout")))
        .and(header("vmware-api-session-id", SESSION))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(server)
        .await;
}

/// Mount a vCenter inventory holding the given `(moid, name)` switches.
pub async fn mount_inventory(server: &MockServer, switches: &[(&str, &str)]) {
    Mock::given(method("GET"))
        .and(path(api("ServiceInstance/ServiceInstance/content")))
        .and(header("vmware-api-session-id", SESSION))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_typeName": "ServiceContent",
            "rootFolder": {"_typeName": "ManagedObjectReference", "type": "Folder", "value": "group-d1"},
            "viewManager": {"_typeName": "ManagedObjectReference", "type": "ViewManager", "value": "ViewManager"},
            "about": {"_typeName": "AboutInfo", "version": "8.0.1"}
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(api("ViewManager/ViewManager/CreateContainerView")))
        .and(body_partial_json(json!({
            "container": {"type": "Folder", "value": "group-d1"},
            "type": ["DistributedVirtualSwitch"],
            "recursive": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_typeName": "ManagedObjectReference",
            "type": "ContainerView",
            "value": VIEW_ID
        })))
        .mount(server)
        .await;

    let refs: Vec<_> = switches
        .iter()
        .map(|(moid, _)| json!({"_typeName": "ManagedObjectReference", "type": "VmwareDistributedVirtualSwitch", "value": moid}))
        .collect();
    Mock::given(method("GET"))
        .and(path(api(&format!("ContainerView/{VIEW_ID}/view"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(refs)))
        .mount(server)
        .await;

    for (moid, name) in switches {
        Mock::given(method("GET"))
            .and(path(api(&format!("VmwareDistributedVirtualSwitch/{moid}/name"))))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(name)))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path(api(&format!("VmwareDistributedVirtualSwitch/{moid}/uuid"))))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(format!("{SWITCH_UUID} {moid}"))))
            .mount(server)
            .await;
    }

    Mock::given(method("POST"))
        .and(path(api(&format!("ContainerView/{VIEW_ID}/DestroyView"))))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(server)
        .await;
}

/// A mock vCenter where `Compute-VDS` is the second of two switches.
pub async fn mock_vcenter() -> MockServer {
    let server = MockServer::start().await;
    mount_session(&server).await;
    mount_inventory(&server, &[("dvs-11", "Mgmt-VDS"), ("dvs-21", "Compute-VDS")]).await;
    server
}

/// UUID the mock returns for switch `moid`.
pub fn uuid_of(moid: &str) -> String {
    format!("{SWITCH_UUID} {moid}")
}
