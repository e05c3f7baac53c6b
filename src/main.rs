//! nsx-install - NSX-T deployment driver
//!
//! This is the main entry point for the nsx-install CLI.

mod cli;

use anyhow::Result;
use cli::commands::CommandContext;
use cli::output::OutputFormatter;
use cli::{Cli, Commands};
use nsx_install::config::Config;
use nsx_install::logging::{LogLevel, LoggingBuilder};

/// Application version information
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    let config = match Config::load(cli.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            OutputFormatter::new(!cli.no_color, cli.verbosity()).error(&e.to_string());
            std::process::exit(e.exit_code());
        }
    };

    // Initialize the install log before anything else is logged
    let use_color = !cli.no_color && config.output.color;
    if let Err(e) = LoggingBuilder::new()
        .with_file_output(&config.paths.log_file)
        .with_stderr(LogLevel::from_verbosity(cli.verbosity()))
        .with_ansi(use_color)
        .init()
    {
        OutputFormatter::new(use_color, cli.verbosity()).warning(&e.to_string());
    }
    tracing::debug!(version = VERSION, command = ?cli.command, "nsx-install started");

    // Create command context
    let mut ctx = CommandContext::new(&cli, config);

    // Execute the appropriate command
    let result = match &cli.command {
        Commands::Start(args) => args.execute(&mut ctx).await,
        Commands::Generate(args) => args.execute(&mut ctx).await,
        Commands::ResetDefaults(args) => args.execute_defaults(&mut ctx),
        Commands::ResetConfig(args) => args.execute_config(&mut ctx),
        Commands::Show(args) => args.execute(&mut ctx).await,
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => report_error(&ctx, &e),
    };

    std::process::exit(exit_code);
}

/// Print a failed command's error and return its exit code
fn report_error(ctx: &CommandContext, err: &anyhow::Error) -> i32 {
    tracing::error!(error = %format!("{err:#}"), "Command failed");
    ctx.output.error(&format!("{err:#}"));

    match err.downcast_ref::<nsx_install::Error>() {
        Some(e @ nsx_install::Error::PlaybookFailed { log, .. }) => {
            ctx.output
                .hint(&format!("Deployment exited with Error. Please check {}", log.display()));
            e.exit_code()
        }
        Some(e @ nsx_install::Error::ParamFileNotFound { .. }) => {
            ctx.output
                .hint("Run 'nsx-install reset-defaults' or 'nsx-install reset-config' to create it");
            e.exit_code()
        }
        Some(e) => {
            ctx.output.hint(&format!(
                "See {} for details",
                ctx.config.paths.log_file.display()
            ));
            e.exit_code()
        }
        None => 1,
    }
}
