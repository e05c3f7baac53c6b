//! The install sequence.
//!
//! Installation is a fixed, ordered list of playbooks, each reading the
//! generated variables file. Steps run one at a time; the first failure stops
//! the install. Steps that deploy appliances are followed by a settle wait so
//! the new VMs can boot before the next step talks to them.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::{Error, ErrorContext, Result};

/// One playbook in the install sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybookStep {
    /// Playbook file name inside the playbook directory
    pub playbook: &'static str,
    /// Progress line shown to the operator before the step
    pub announce: Option<&'static str>,
    /// Log line recorded before the step
    pub description: &'static str,
    /// Sleep for the settle period after the step
    pub settle: bool,
    /// Only runs when a three node manager cluster is requested
    pub cluster_only: bool,
}

const fn step(
    playbook: &'static str,
    announce: Option<&'static str>,
    description: &'static str,
) -> PlaybookStep {
    PlaybookStep {
        playbook,
        announce,
        description,
        settle: false,
        cluster_only: false,
    }
}

const fn settled(mut s: PlaybookStep) -> PlaybookStep {
    s.settle = true;
    s
}

/// The full install sequence, in order.
pub const INSTALL_STEPS: [PlaybookStep; 12] = [
    settled(step(
        "01_deploy_first_node.yml",
        Some("Deploying NSX Manager Cluster"),
        "Deploying first NSX node",
    )),
    step(
        "02_add_nsx_license_accept_eula.yml",
        None,
        "Accepting EULA and adding NSX License",
    ),
    step("03_configure_compute_manager.yml", None, "Configuring Compute Manager"),
    PlaybookStep {
        playbook: "04_deploy_second_third_node.yml",
        announce: None,
        description: "Deploying second and third NSX node",
        settle: true,
        cluster_only: true,
    },
    step("05_setup_transport_zones.yml", None, "Deploying Transport Zones"),
    step(
        "06_create_tunnel_ip_pools.yml",
        Some("Deploying Edge Cluster"),
        "Deploying Tunnel IPs",
    ),
    settled(step(
        "07_create_edge_transport_nodes.yml",
        None,
        "Creating Edge Transport nodes",
    )),
    step("08_setup_edge_cluster.yml", None, "Creating Edge Cluster"),
    step(
        "09_configure_t0_gateway.yml",
        Some("Creating a Tier0 Gateway"),
        "Configuring T0 Gateway",
    ),
    step(
        "10_create_host_switch_profile.yml",
        Some("Creating Uplink Host Switch Profile"),
        "Creating Uplink Host Switch Profile",
    ),
    step(
        "11_create_transport_node_profiles.yml",
        Some("Prepping Hosts for NSX"),
        "Creating Transport Node Profile",
    ),
    step("12_configure_nsx_on_cluster.yml", None, "Prepping hosts"),
];

/// Message shown when the secondary manager nodes are not deployed.
pub const SKIP_CLUSTER_MESSAGE: &str = "Skipping NSX Manager cluster deployment. Single node deployed";

/// Message shown when every step has completed.
pub const DONE_MESSAGE: &str = "All deployments done!";

/// Runs a single playbook to completion.
#[async_trait]
pub trait PlaybookRunner: Send + Sync {
    /// Run `playbook`, returning an error if it did not succeed.
    async fn run(&self, playbook: &Path) -> Result<()>;

    /// Whether the settle wait applies to this runner.
    fn settles(&self) -> bool {
        true
    }
}

/// Runs playbooks with `ansible-playbook`, appending all output to the install log.
#[derive(Debug, Clone)]
pub struct AnsibleRunner {
    executable: PathBuf,
    args: Vec<String>,
    workdir: PathBuf,
    log_file: PathBuf,
}

impl AnsibleRunner {
    /// Locate the runner executable and prepare to run playbooks from `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let executable = which::which(&config.ansible.executable)
            .map_err(|_| Error::RunnerNotFound(config.ansible.executable.clone()))?;
        debug!(executable = %executable.display(), "Located playbook runner");

        Ok(Self {
            executable,
            args: config.ansible.args.clone(),
            workdir: config.paths.playbook_dir.clone(),
            log_file: absolute(&config.paths.log_file)?,
        })
    }

    /// The command line that will run `playbook`, for logging.
    pub fn command_line(&self, playbook: &Path) -> String {
        let mut parts = vec![self.executable.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.push(playbook.display().to_string());
        parts.join(" ")
    }
}

#[async_trait]
impl PlaybookRunner for AnsibleRunner {
    async fn run(&self, playbook: &Path) -> Result<()> {
        let log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)
            .with_context(|| format!("Failed to open log file {}", self.log_file.display()))?;
        let log_err = log
            .try_clone()
            .with_context(|| format!("Failed to open log file {}", self.log_file.display()))?;

        debug!(command = %self.command_line(playbook), cwd = %self.workdir.display(), "Running command");

        let status = Command::new(&self.executable)
            .args(&self.args)
            .arg(playbook)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(log_err))
            .status()
            .await
            .with_context(|| format!("Failed to spawn {}", self.executable.display()))?;

        if status.success() {
            Ok(())
        } else {
            error!(command = %self.command_line(playbook), ?status, "Could not run playbook");
            Err(Error::PlaybookFailed {
                playbook: playbook.to_path_buf(),
                code: status.code(),
                log: self.log_file.clone(),
            })
        }
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    Ok(cwd.join(path))
}

/// Records playbooks without running anything.
#[derive(Debug, Default)]
pub struct DryRunRunner;

#[async_trait]
impl PlaybookRunner for DryRunRunner {
    async fn run(&self, playbook: &Path) -> Result<()> {
        info!(playbook = %playbook.display(), "Dry run, not executing");
        Ok(())
    }

    fn settles(&self) -> bool {
        false
    }
}

/// Receives operator-facing progress from the [`Orchestrator`].
pub trait Progress {
    /// A user-facing progress line.
    fn message(&mut self, text: &str);

    /// A step is about to run.
    fn step(&mut self, _step: &PlaybookStep) {}
}

/// Drives [`INSTALL_STEPS`] through a runner.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    steps: Vec<PlaybookStep>,
    manager_cluster: bool,
    settle: Duration,
}

impl Orchestrator {
    /// Create an orchestrator for the standard install sequence.
    pub fn new(manager_cluster: bool, settle: Duration) -> Self {
        Self {
            steps: INSTALL_STEPS.to_vec(),
            manager_cluster,
            settle,
        }
    }

    /// Steps that will run, in order.
    pub fn planned(&self) -> impl Iterator<Item = &PlaybookStep> {
        self.steps
            .iter()
            .filter(|s| self.manager_cluster || !s.cluster_only)
    }

    /// Run every step, stopping at the first failure.
    pub async fn run<R, P>(&self, runner: &R, progress: &mut P) -> Result<()>
    where
        R: PlaybookRunner + ?Sized,
        P: Progress + ?Sized,
    {
        for step in &self.steps {
            if let Some(text) = step.announce {
                progress.message(text);
            }

            if step.cluster_only && !self.manager_cluster {
                progress.message(SKIP_CLUSTER_MESSAGE);
                debug!(playbook = step.playbook, "Skipping cluster deployment");
                continue;
            }

            debug!(playbook = step.playbook, "{}", step.description);
            progress.step(step);
            runner.run(Path::new(step.playbook)).await?;

            if step.settle && runner.settles() && !self.settle.is_zero() {
                debug!(playbook = step.playbook, secs = self.settle.as_secs(), "Waiting for deployment to settle");
                tokio::time::sleep(self.settle).await;
            }
        }

        debug!("Install sequence complete");
        progress.message(DONE_MESSAGE);
        Ok(())
    }
}
