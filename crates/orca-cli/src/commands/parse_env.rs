//! `orca parse-env`

use crate::error::Result;
use orca_config::parse_environment;
use serde_json::{Value, json};

pub fn run_parse_env(selector: &str) -> Result<Value> {
    let parsed = parse_environment(selector)?;
    Ok(json!({
        "environment": parsed.environment,
        "namespace": parsed.namespace,
    }))
}
