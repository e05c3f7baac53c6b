//! Configuration module for nsx-install
//!
//! Tool settings (where the parameter files live, how playbooks are run, how
//! vCenter is reached) come from, in increasing precedence:
//! - Default values
//! - A configuration file (`--config`, `NSX_INSTALL_CONFIG` or `./nsx-install.toml`)
//! - Environment variables
//!
//! The install parameters themselves are not part of this configuration; they
//! live in the flat defaults and config files handled by [`crate::params`].

use crate::error::{Error, ErrorContext, Result};
use crate::vars::VarsFormat;
use crate::vsphere::DEFAULT_API_RELEASE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "nsx-install.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// File locations
    pub paths: PathsConfig,

    /// Playbook runner settings
    pub ansible: AnsibleConfig,

    /// vCenter API client settings
    pub vsphere: VsphereConfig,

    /// Terminal and variables file output
    pub output: OutputConfig,
}

/// File locations, relative to the working directory unless absolute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Factory defaults parameter file
    pub defaults_file: PathBuf,

    /// User configuration parameter file
    pub config_file: PathBuf,

    /// Generated variables file read by the playbooks, relative to `playbook_dir`
    pub vars_file: PathBuf,

    /// Install log, appended to on every run
    pub log_file: PathBuf,

    /// Directory holding the numbered playbooks
    pub playbook_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            defaults_file: PathBuf::from("nsx-defaults.txt"),
            config_file: PathBuf::from("nsx-config.txt"),
            vars_file: PathBuf::from("nsx_pacific_vars.yml"),
            log_file: PathBuf::from("nsx-install.log"),
            playbook_dir: PathBuf::from("."),
        }
    }
}

/// Playbook runner settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnsibleConfig {
    /// Runner executable, looked up in PATH
    pub executable: String,

    /// Arguments placed before the playbook name
    pub args: Vec<String>,

    /// Seconds to wait after steps that deploy appliances
    pub settle_secs: u64,
}

impl Default for AnsibleConfig {
    fn default() -> Self {
        Self {
            executable: "ansible-playbook".to_string(),
            args: vec!["-vvvv".to_string()],
            settle_secs: 300,
        }
    }
}

/// vCenter API client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VsphereConfig {
    /// API base URL, `https://<vcenter_fqdn>/` when unset
    pub url: Option<String>,

    /// VI/JSON API release in request paths
    pub api_release: String,

    /// Per-request timeout
    pub timeout_secs: u64,

    /// Accept self-signed vCenter certificates
    pub accept_invalid_certs: bool,
}

impl Default for VsphereConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_release: DEFAULT_API_RELEASE.to_string(),
            timeout_secs: 30,
            accept_invalid_certs: true,
        }
    }
}

/// Output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Colored terminal output
    pub color: bool,

    /// Encoding of the variables file
    pub vars_format: VarsFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: true,
            vars_format: VarsFormat::Json,
        }
    }
}

impl Config {
    /// Load configuration from the first config file found, then apply
    /// environment overrides. An explicitly named file must exist.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = match Self::get_config_path(config_path) {
            (path, true) => Self::from_file(&path)?,
            (path, false) if path.exists() => Self::from_file(&path)?,
            _ => Config::default(),
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// The config file to read and whether it was named explicitly
    fn get_config_path(explicit_path: Option<&PathBuf>) -> (PathBuf, bool) {
        if let Some(path) = explicit_path {
            return (path.clone(), true);
        }

        match std::env::var("NSX_INSTALL_CONFIG") {
            Ok(path) if !path.is_empty() => (PathBuf::from(path), true),
            _ => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        }
    }

    /// Where the variables file is written: next to the playbooks.
    pub fn vars_path(&self) -> PathBuf {
        self.paths.playbook_dir.join(&self.paths.vars_file)
    }

    /// Load from a specific file, format chosen by extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let config = match extension {
            "yml" | "yaml" => serde_yaml::from_str(&content)?,
            "json" => serde_json::from_str(&content)?,
            _ => toml::from_str(&content)?,
        };

        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // NSX_INSTALL_LOG
        if let Ok(path) = std::env::var("NSX_INSTALL_LOG") {
            self.paths.log_file = PathBuf::from(path);
        }

        // NSX_INSTALL_PLAYBOOK_DIR
        if let Ok(dir) = std::env::var("NSX_INSTALL_PLAYBOOK_DIR") {
            self.paths.playbook_dir = PathBuf::from(dir);
        }

        // NSX_INSTALL_ANSIBLE
        if let Ok(executable) = std::env::var("NSX_INSTALL_ANSIBLE") {
            self.ansible.executable = executable;
        }

        // NSX_INSTALL_SETTLE_SECS
        if let Ok(secs) = std::env::var("NSX_INSTALL_SETTLE_SECS") {
            if let Ok(n) = secs.parse() {
                self.ansible.settle_secs = n;
            }
        }

        // NO_COLOR
        if std::env::var("NO_COLOR").is_ok() {
            self.output.color = false;
        }
    }
}
