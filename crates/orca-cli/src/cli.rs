//! CLI argument parsing using clap derive

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// orca - Resolve project environments and activate their providers
#[derive(Parser, Debug)]
#[command(name = "orca")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project root containing orca.yml
    #[arg(long, global = true, env = "ORCA_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Parse an environment selector without loading a project
    ///
    /// Examples:
    ///   orca parse-env dev
    ///   orca parse-env alice.dev
    ParseEnv {
        /// `<environment>` or `<namespace>.<environment>`
        selector: String,
    },

    /// Print the merged variables and providers of an environment
    Environment(EnvironmentArgs),

    /// Resolve every provider of an environment and report readiness
    Providers {
        #[command(flatten)]
        environment: EnvironmentArgs,

        /// Prepare every provider even if it reports ready
        #[arg(long)]
        force_init: bool,
    },
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentArgs {
    /// Environment selector; defaults to the project's default environment
    #[arg(short, long, env = "ORCA_ENV")]
    pub env: Option<String>,

    /// Override a variable, highest precedence (repeatable)
    #[arg(long = "var", value_name = "KEY=VALUE")]
    pub vars: Vec<String>,
}
