//! Reset commands: rewrite the defaults or user config template.

use super::CommandContext;
use anyhow::Result;
use clap::Parser;
use nsx_install::params::{templates, write_template, Template};
use std::path::PathBuf;
use tracing::debug;

/// Arguments for the reset-defaults and reset-config commands
#[derive(Parser, Debug, Clone, Default)]
pub struct ResetArgs {
    /// Write to this file instead of the configured one
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl ResetArgs {
    /// Rewrite the factory defaults file
    pub fn execute_defaults(&self, ctx: &mut CommandContext) -> Result<i32> {
        let path = self
            .output
            .clone()
            .unwrap_or_else(|| ctx.config.paths.defaults_file.clone());
        reset(ctx, &path, &templates::factory_defaults())?;
        ctx.output.progress("Resetting defaults done.");
        Ok(0)
    }

    /// Rewrite the user config template
    pub fn execute_config(&self, ctx: &mut CommandContext) -> Result<i32> {
        let path = self
            .output
            .clone()
            .unwrap_or_else(|| ctx.config.paths.config_file.clone());
        reset(ctx, &path, &templates::user_config())?;
        ctx.output.progress("Resetting User Config done.");
        Ok(0)
    }
}

fn reset(ctx: &CommandContext, path: &std::path::Path, template: &Template) -> Result<()> {
    if path.exists() {
        debug!(file = %path.display(), "Overwriting existing file");
        ctx.output
            .info(&format!("Overwriting {}", path.display()));
    }
    write_template(path, template)?;
    Ok(())
}
