//! Command implementations for orca-cli
//!
//! Each command returns the JSON it prints so tests can inspect it directly.

pub mod environment;
pub mod parse_env;
pub mod providers;

pub use environment::run_environment;
pub use parse_env::run_parse_env;
pub use providers::run_providers;

use crate::cli::EnvironmentArgs;
use crate::error::{CliError, Result};
use orca_config::{
    LocalContext, ProjectConfig, ResolvedEnvironment, Variables, pick_environment_with_overrides,
    resolve_project_config,
};
use orca_fs::{ConfigStore, NormalizedPath};
use serde_json::Value;
use std::path::Path;

/// Project document names, in lookup order.
pub const PROJECT_CONFIG_FILES: &[&str] = &["orca.yml", "orca.yaml", "orca.json", "orca.toml"];

/// Load and resolve the project rooted at `root`.
pub fn load_project(root: &Path, local: &LocalContext) -> Result<ProjectConfig> {
    let root = NormalizedPath::new(std::path::absolute(root)?);

    let Some(path) = PROJECT_CONFIG_FILES
        .iter()
        .map(|name| root.join(name))
        .find(NormalizedPath::is_file)
    else {
        return Err(CliError::user(format!(
            "No project configuration found in {root}. Expected one of: {}",
            PROJECT_CONFIG_FILES.join(", ")
        )));
    };

    tracing::debug!(%path, "Loading project configuration");
    let raw = ConfigStore::new().load_value(&path)?;
    Ok(resolve_project_config(&raw, &root, local)?)
}

/// Parse `KEY=VALUE` overrides. Values that parse as JSON keep their type.
pub fn parse_overrides(vars: &[String]) -> Result<Variables> {
    let mut overrides = Variables::new();
    for entry in vars {
        let Some((key, value)) = entry.split_once('=') else {
            return Err(CliError::user(format!(
                "Invalid variable override '{entry}': expected KEY=VALUE"
            )));
        };
        if key.is_empty() {
            return Err(CliError::user(format!(
                "Invalid variable override '{entry}': key must not be empty"
            )));
        }
        let value =
            serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
        overrides.insert(key.to_string(), value);
    }
    Ok(overrides)
}

/// Select the environment named by `args`, or the project's default.
pub fn select_environment(
    project: &ProjectConfig,
    args: &EnvironmentArgs,
) -> Result<ResolvedEnvironment> {
    let selector = args.env.as_deref().unwrap_or(&project.default_environment);
    let overrides = parse_overrides(&args.vars)?;
    Ok(pick_environment_with_overrides(project, selector, &overrides)?)
}
