use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use enklave_cli::commands::{events, report, total};
use enklave_cli::{Cli, Commands, Config};

/// Load config and apply the `--dir` override.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(dir) = &cli.dir {
        config.mail_dir.clone_from(dir);
    }
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // Diagnostics go to stderr so stdout carries only results
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config = load_config(&cli)?;
    let mut stdout = std::io::stdout().lock();

    match &cli.command {
        None | Some(Commands::Total) => total::run(&mut stdout, &config)?,
        Some(Commands::Report { json }) => report::run(&mut stdout, &config, *json)?,
        Some(Commands::Events) => events::run(&mut stdout, &config)?,
    }

    Ok(())
}
