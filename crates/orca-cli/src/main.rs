//! orca CLI
//!
//! Loads a project, selects an environment and resolves its providers,
//! printing the result as JSON.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;
use orca_config::LocalContext;

use cli::{Cli, Commands};
use error::{CliError, Result};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose)
        .map_err(|e| CliError::user(format!("Failed to set up logging: {e}")))?;
    tracing::debug!(root = %cli.root.display(), "Starting orca");

    let local = LocalContext::capture();

    let output = match &cli.command {
        Commands::ParseEnv { selector } => commands::run_parse_env(selector)?,
        Commands::Environment(args) => commands::run_environment(&cli.root, args, &local)?,
        Commands::Providers {
            environment,
            force_init,
        } => commands::run_providers(&cli.root, environment, *force_init, &local).await?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
