//! `orca environment`

use super::{load_project, select_environment};
use crate::cli::EnvironmentArgs;
use crate::error::Result;
use orca_config::LocalContext;
use serde_json::Value;
use std::path::Path;

pub fn run_environment(root: &Path, args: &EnvironmentArgs, local: &LocalContext) -> Result<Value> {
    let project = load_project(root, local)?;
    let environment = select_environment(&project, args)?;
    Ok(serde_json::to_value(&environment)?)
}
