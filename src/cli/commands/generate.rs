//! Generate command: build the variables file without installing.

use super::CommandContext;
use anyhow::Result;
use clap::Parser;
use nsx_install::vars::{VarsBuilder, VarsDocument};
use nsx_install::vsphere::{SwitchLookup, VcenterCredentials, VsphereClient};
use std::path::PathBuf;
use tracing::{debug, info};

/// Arguments for the generate command
#[derive(Parser, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// Write the variables file here instead of next to the playbooks
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl GenerateArgs {
    /// Execute the generate command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let path = self.output.clone().unwrap_or_else(|| ctx.config.vars_path());
        generate_vars(ctx, &path).await?;
        ctx.output
            .progress(&format!("Variables file generated: {}", path.display()));
        Ok(0)
    }
}

/// Read both parameter files, resolve the host VDS and write the variables file.
pub async fn generate_vars(ctx: &CommandContext, path: &std::path::Path) -> Result<VarsDocument> {
    debug!("Generating variables file");
    let defaults = ctx.load_defaults()?;
    let user = ctx.load_user_config()?;
    let builder = VarsBuilder::new(&defaults, &user);
    builder.validate()?;

    let credentials = VcenterCredentials::from_params(&user)?;
    let vds_name = user.require("host_vds_name")?;
    ctx.output
        .info(&format!("Looking up distributed switch {} on {}", vds_name, credentials.host));

    let client = VsphereClient::builder()
        .config(&ctx.config.vsphere)
        .credentials(credentials)
        .build()?;
    let switch_id = client.switch_uuid(vds_name).await?;
    ctx.output.debug(&format!("VDS {} has UUID: {}", vds_name, switch_id));

    let doc = builder.build(&switch_id)?;
    doc.write(path, ctx.config.output.vars_format)?;
    info!(file = %path.display(), "Variables file generated");
    Ok(doc)
}
