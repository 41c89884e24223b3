//! Varfile loading

use crate::value::Variables;
use crate::{Error, Result};
use orca_fs::{ConfigStore, NormalizedPath};
use serde_json::Value;

/// Load variables from a varfile.
///
/// A missing file yields an empty mapping unless `required` is set, which
/// callers do when the path was configured explicitly rather than defaulted.
pub fn load_varfile(path: &NormalizedPath, required: bool) -> Result<Variables> {
    if !path.is_file() {
        if required {
            return Err(Error::configuration(format!(
                "Could not find varfile at path '{path}'"
            )));
        }
        tracing::debug!(%path, "No varfile found, skipping");
        return Ok(Variables::new());
    }

    let value = ConfigStore::new().load_value(path).map_err(|e| {
        Error::configuration(format!("Unable to load varfile at '{path}': {e}"))
    })?;

    match value {
        Value::Object(map) => {
            tracing::debug!(%path, count = map.len(), "Loaded varfile");
            Ok(map)
        }
        Value::Null => Ok(Variables::new()),
        other => Err(Error::configuration(format!(
            "Varfile at '{path}' must contain a mapping of variables, got {}",
            type_name(&other)
        ))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
