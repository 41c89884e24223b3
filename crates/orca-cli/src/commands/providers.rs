//! `orca providers`

use super::{load_project, select_environment};
use crate::cli::EnvironmentArgs;
use crate::error::Result;
use orca_config::LocalContext;
use orca_providers::{PluginRegistry, ProviderResolver, ResolutionContext};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

/// Resolve every provider of the selected environment with the built-in
/// plugins.
pub async fn run_providers(
    root: &Path,
    args: &EnvironmentArgs,
    force_init: bool,
    local: &LocalContext,
) -> Result<Value> {
    let project = load_project(root, local)?;
    let environment = select_environment(&project, args)?;
    let registry = PluginRegistry::with_builtins(Vec::new())?;

    let context = ResolutionContext::new(&project, environment, Arc::new(registry))
        .with_local(local.clone())
        .with_force_init(force_init);
    let providers = ProviderResolver::new(context).resolve_all().await?;

    Ok(Value::Array(providers.iter().map(|p| p.summary()).collect()))
}
