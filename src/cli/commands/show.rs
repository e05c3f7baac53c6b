//! Show command: print a parsed parameter file with secrets masked.

use super::CommandContext;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use nsx_install::params::ParamFile;

/// Which parameter file to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShowTarget {
    /// Factory defaults
    Defaults,
    /// User configuration
    Config,
}

/// Arguments for the show command
#[derive(Parser, Debug, Clone)]
pub struct ShowArgs {
    /// File to show
    #[arg(value_enum)]
    pub target: ShowTarget,
}

impl ShowArgs {
    /// Execute the show command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let (title, params) = match self.target {
            ShowTarget::Defaults => ("DEFAULTS", ctx.load_defaults()?),
            ShowTarget::Config => ("USER CONFIGURATION", ctx.load_user_config()?),
        };

        ctx.output.banner(title);
        ctx.output.info(&format!("Source: {}", params.source()));
        ctx.output.table(&rows(&params));

        let empty: Vec<_> = params
            .iter()
            .filter(|(_, v)| v.is_empty())
            .map(|(k, _)| k)
            .collect();
        if !empty.is_empty() {
            ctx.output
                .warning(&format!("{} parameter(s) have no value: {}", empty.len(), empty.join(", ")));
        }

        Ok(0)
    }
}

/// Entries in file order, secrets masked.
fn rows(params: &ParamFile) -> Vec<(String, String)> {
    params
        .iter()
        .map(|(key, value)| {
            let shown = if is_secret(key) && !value.is_empty() {
                "********".to_string()
            } else {
                value.to_string()
            };
            (key.to_string(), shown)
        })
        .collect()
}

fn is_secret(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key.contains("password") || key.contains("license")
}
