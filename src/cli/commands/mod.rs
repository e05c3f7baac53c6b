//! Subcommands module for nsx-install CLI
//!
//! This module contains all the subcommand implementations.

pub mod generate;
pub mod reset;
pub mod show;
pub mod start;

use crate::cli::output::OutputFormatter;
use anyhow::Result;
use nsx_install::config::Config;
use nsx_install::params::ParamFile;

/// Common context shared between commands
pub struct CommandContext {
    /// Configuration
    pub config: Config,
    /// Output formatter
    pub output: OutputFormatter,
}

impl CommandContext {
    /// Create a new command context from CLI arguments
    pub fn new(cli: &crate::cli::Cli, config: Config) -> Self {
        let output = OutputFormatter::new(!cli.no_color && config.output.color, cli.verbosity());

        Self { config, output }
    }

    /// Load the factory defaults file
    pub fn load_defaults(&self) -> Result<ParamFile> {
        Ok(ParamFile::load(&self.config.paths.defaults_file)?)
    }

    /// Load the user config file
    pub fn load_user_config(&self) -> Result<ParamFile> {
        Ok(ParamFile::load(&self.config.paths.config_file)?)
    }
}
