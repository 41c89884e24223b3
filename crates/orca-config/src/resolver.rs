//! Project configuration resolution
//!
//! Normalizes a raw project document into a [`ProjectConfig`]:
//!
//! 1. Template strings are resolved everywhere except in provider
//!    declarations, which may reference other providers' outputs and are
//!    resolved per provider later on.
//! 2. The document is checked against the project schema, which also fills
//!    in defaults.
//! 3. A default environment is injected when none is named or declared.
//! 4. Providers declared inline on an environment are moved to the
//!    top-level provider list, scoped to that environment.

use crate::environment::is_valid_name;
use crate::project::{DEFAULT_ENVIRONMENT_NAME, EnvironmentConfig, ProjectConfig};
use crate::schema::ConfigSchema;
use crate::template::{LocalContext, TemplateContext};
use crate::{Error, Result};
use orca_fs::NormalizedPath;
use serde_json::{Map, Value};

/// Resolve a raw project document rooted at `project_root`.
pub fn resolve_project_config(
    raw: &Value,
    project_root: &NormalizedPath,
    local: &LocalContext,
) -> Result<ProjectConfig> {
    let Some(document) = raw.as_object() else {
        return Err(Error::configuration(
            "Error validating project configuration: value must be an object",
        ));
    };

    let project_name = document
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    tracing::debug!(project = %project_name, root = %project_root, "Resolving project config");

    let (stripped, detached) = detach_providers(document);
    let context = TemplateContext::for_project(&project_name, project_root, local);
    let resolved = context.resolve_value(&Value::Object(stripped))?;
    let document = reattach_providers(resolved, detached);

    let document = ConfigSchema::project().validate(&document, "project configuration", false)?;
    let mut config: ProjectConfig = serde_json::from_value(document).map_err(|e| {
        Error::configuration(format!("Error validating project configuration: {e}"))
    })?;
    config.path = project_root.clone();

    inject_default_environment(&mut config);
    check_environments(&config)?;
    convert_inline_providers(&mut config);

    Ok(config)
}

/// Provider blocks removed from a document before template resolution.
struct DetachedProviders {
    project: Option<Value>,
    /// Indexed like the document's `environments` array
    environments: Vec<Option<Value>>,
}

fn detach_providers(document: &Map<String, Value>) -> (Map<String, Value>, DetachedProviders) {
    let mut stripped = document.clone();
    let project = stripped.remove("providers");

    let mut environments = Vec::new();
    if let Some(Value::Array(envs)) = stripped.get_mut("environments") {
        for env in envs.iter_mut() {
            environments.push(env.as_object_mut().and_then(|e| e.remove("providers")));
        }
    }

    (stripped, DetachedProviders { project, environments })
}

fn reattach_providers(mut document: Value, detached: DetachedProviders) -> Value {
    let Some(map) = document.as_object_mut() else {
        return document;
    };

    if let Some(Value::Array(envs)) = map.get_mut("environments") {
        for (env, providers) in envs.iter_mut().zip(detached.environments) {
            if let (Some(env), Some(providers)) = (env.as_object_mut(), providers) {
                env.insert("providers".to_string(), providers);
            }
        }
    }
    if let Some(providers) = detached.project {
        map.insert("providers".to_string(), providers);
    }

    document
}

fn inject_default_environment(config: &mut ProjectConfig) {
    if config.environments.is_empty() {
        tracing::debug!("No environments declared, adding '{}'", DEFAULT_ENVIRONMENT_NAME);
        config
            .environments
            .push(EnvironmentConfig::new(DEFAULT_ENVIRONMENT_NAME));
    }

    if config.default_environment.is_empty() {
        config.default_environment = config.environments[0].name.clone();
    }
}

fn check_environments(config: &ProjectConfig) -> Result<()> {
    for (index, env) in config.environments.iter().enumerate() {
        if !is_valid_name(&env.name) {
            return Err(Error::configuration(format!(
                "Error validating project configuration: key .environments[{index}].name must be a valid environment name (got '{}')",
                env.name
            )));
        }
        if config.environments[..index].iter().any(|e| e.name == env.name) {
            return Err(Error::configuration(format!(
                "Duplicate environment name '{}' in project {}",
                env.name, config.name
            )));
        }
    }

    if config.environment(&config.default_environment).is_none() {
        return Err(Error::configuration(format!(
            "The specified default environment '{}' is not defined. Available environments: {}",
            config.default_environment,
            config.environment_names().join(", ")
        )));
    }

    Ok(())
}

fn convert_inline_providers(config: &mut ProjectConfig) {
    for env in &mut config.environments {
        for provider in std::mem::take(&mut env.providers) {
            tracing::debug!(
                provider = %provider.name,
                environment = %env.name,
                "Moving inline provider declaration to project level"
            );
            config
                .providers
                .push(provider.with_environments([env.name.clone()]));
        }
    }
}
