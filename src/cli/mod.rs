//! CLI module for nsx-install
//!
//! This module provides the command-line interface, including argument
//! parsing and subcommand handling.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// nsx-install - NSX-T deployment driver
///
/// Generates the NSX-T install variables from flat key-value files and runs
/// the Ansible install sequence.
#[derive(Parser, Debug, Clone)]
#[command(name = "nsx-install")]
#[command(author = "nsx-install Contributors")]
#[command(version)]
#[command(about = "Install NSX-T from flat key-value configuration", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level; also mirrors the install log to stderr (-v, -vv, -vvv)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true, env = "NSX_INSTALL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Generate the variables file and run the install sequence
    Start(commands::start::StartArgs),

    /// Only generate the variables file
    #[command(alias = "manual")]
    Generate(commands::generate::GenerateArgs),

    /// Reset the defaults file to factory settings
    ResetDefaults(commands::reset::ResetArgs),

    /// Reset the user config file to a blank template
    ResetConfig(commands::reset::ResetArgs),

    /// Show the parsed defaults or user config
    Show(commands::show::ShowArgs),
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Get the effective verbosity level (0-3)
    pub fn verbosity(&self) -> u8 {
        self.verbose.min(3)
    }
}
