//! Start command: generate the variables file and run the install sequence.

use super::generate::generate_vars;
use super::CommandContext;
use crate::cli::output::OutputFormatter;
use anyhow::Result;
use clap::Parser;
use nsx_install::playbook::{
    AnsibleRunner, DryRunRunner, Orchestrator, PlaybookStep, Progress, DONE_MESSAGE,
};
use std::time::Duration;
use tracing::debug;

/// Arguments for the start command
#[derive(Parser, Debug, Clone, Default)]
pub struct StartArgs {
    /// Generate the variables file and list the playbooks without running them
    #[arg(long)]
    pub dry_run: bool,
}

impl StartArgs {
    /// Execute the start command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        debug!(dry_run = self.dry_run, "install: Started");

        // Fail before touching vCenter if the runner is missing.
        let runner = if self.dry_run {
            None
        } else {
            Some(AnsibleRunner::from_config(&ctx.config)?)
        };

        let vars_path = ctx.config.vars_path();
        let doc = generate_vars(ctx, &vars_path).await?;
        debug!("install: Variables file generated");
        ctx.output.progress("Variables file generated, Starting install");

        let orchestrator = Orchestrator::new(
            doc.is_manager_cluster(),
            Duration::from_secs(ctx.config.ansible.settle_secs),
        );

        let steps = orchestrator.planned().count();
        debug!(steps, "install: Playbooks planned");

        match runner {
            Some(runner) => {
                orchestrator.run(&runner, &mut ctx.output).await?;
            }
            None => {
                ctx.output.section(&format!("Dry run: {steps} playbooks"));
                let mut progress = DryRunProgress(&ctx.output);
                orchestrator.run(&DryRunRunner, &mut progress).await?;
            }
        }

        debug!("install: Done");
        Ok(0)
    }
}

/// Lists each playbook instead of announcing progress.
struct DryRunProgress<'a>(&'a OutputFormatter);

impl Progress for DryRunProgress<'_> {
    fn message(&mut self, text: &str) {
        if text == DONE_MESSAGE {
            self.0.success("Dry run complete, no playbooks were run");
        } else {
            self.0.progress(text);
        }
    }

    fn step(&mut self, step: &PlaybookStep) {
        let wait = if step.settle { " (then settle)" } else { "" };
        self.0.plan(&format!("  would run {}{}", step.playbook, wait));
    }
}
