//! Environment selection
//!
//! Turns a selector such as `dev` or `alice.dev` into a fully merged
//! [`ResolvedEnvironment`]: namespacing policy enforced, variables layered
//! from inline declarations and varfiles, and provider fragments patched.

use crate::patch::merge_provider_configs;
use crate::project::{DEFAULT_PROJECT_VARFILE, Namespacing, ProjectConfig, ProviderConfig};
use crate::value::{Variables, merge_variables};
use crate::varfile::load_varfile;
use crate::{Error, Result};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?$").expect("Invalid environment name regex")
});

/// Whether `name` is a valid environment or namespace name (a DNS label).
pub fn is_valid_name(name: &str) -> bool {
    NAME_PATTERN.is_match(name)
}

/// A parsed environment selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentSelector {
    pub environment: String,
    pub namespace: Option<String>,
}

/// Parse `<environment>` or `<namespace>.<environment>`.
pub fn parse_environment(selector: &str) -> Result<EnvironmentSelector> {
    let segments: Vec<&str> = selector.split('.').collect();

    if segments.len() > 2 {
        return Err(Error::configuration(format!(
            "Invalid environment specified ({selector}): may only contain a single delimiter"
        )));
    }

    if !segments.iter().all(|segment| is_valid_name(segment)) {
        return Err(Error::configuration(format!(
            "Invalid environment specified ({selector}): must be a valid environment name or <namespace>.<environment>"
        )));
    }

    Ok(match segments.as_slice() {
        [namespace, environment] => EnvironmentSelector {
            environment: (*environment).to_string(),
            namespace: Some((*namespace).to_string()),
        },
        _ => EnvironmentSelector {
            environment: selector.to_string(),
            namespace: None,
        },
    })
}

/// One environment's fully merged configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedEnvironment {
    pub name: String,
    pub namespace: Option<String>,
    /// `<namespace>.<name>` or just `<name>`
    pub full_name: String,
    pub production: bool,
    pub variables: Variables,
    pub providers: Vec<ProviderConfig>,
}

/// Select and materialize an environment.
pub fn pick_environment(config: &ProjectConfig, selector: &str) -> Result<ResolvedEnvironment> {
    pick_environment_with_overrides(config, selector, &Variables::new())
}

/// Like [`pick_environment`], with `overrides` merged on top of every other
/// variable source.
pub fn pick_environment_with_overrides(
    config: &ProjectConfig,
    selector: &str,
    overrides: &Variables,
) -> Result<ResolvedEnvironment> {
    let EnvironmentSelector {
        environment,
        namespace,
    } = parse_environment(selector)?;

    let env_config = config.environment(&environment).ok_or_else(|| {
        Error::parameter(format!(
            "Project {} does not specify environment {}. Available environments: {}",
            config.name,
            environment,
            config.environment_names().join(", ")
        ))
    })?;

    match (env_config.namespacing, &namespace) {
        (Namespacing::Required, None) => {
            return Err(Error::configuration(format!(
                "Environment {environment} requires a namespace, but none was specified."
            )));
        }
        (Namespacing::Disabled, Some(ns)) => {
            return Err(Error::configuration(format!(
                "Environment {environment} does not allow namespacing, but namespace '{ns}' was specified."
            )));
        }
        _ => {}
    }

    let project_varfile = load_varfile(
        &config.path.resolve(&config.varfile),
        config.varfile != DEFAULT_PROJECT_VARFILE,
    )?;
    let (env_varfile_path, explicit) = env_config.varfile_path();
    let env_varfile = load_varfile(&config.path.resolve(&env_varfile_path), explicit)?;

    let variables = merge_variables([
        &config.variables,
        &project_varfile,
        &env_config.variables,
        &env_varfile,
        overrides,
    ]);

    let providers = merge_provider_configs(&config.providers, &environment)?;

    let full_name = match &namespace {
        Some(ns) => format!("{ns}.{environment}"),
        None => environment.clone(),
    };

    tracing::info!(
        environment = %full_name,
        providers = providers.len(),
        variables = variables.len(),
        "Picked environment"
    );

    Ok(ResolvedEnvironment {
        name: environment,
        namespace,
        full_name,
        production: env_config.production,
        variables,
        providers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parse_plain_environment() {
        assert_eq!(
            parse_environment("env").unwrap(),
            EnvironmentSelector {
                environment: "env".into(),
                namespace: None
            }
        );
    }

    #[test]
    fn test_parse_namespaced_environment() {
        assert_eq!(
            parse_environment("ns.env").unwrap(),
            EnvironmentSelector {
                environment: "env".into(),
                namespace: Some("ns".into())
            }
        );
    }

    #[test]
    fn test_parse_rejects_multiple_delimiters() {
        let err = parse_environment("a.b.c").unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
        assert!(err.to_string().contains("single delimiter"));
    }

    #[rstest]
    #[case("&.$")]
    #[case("Prod")]
    #[case("-dev")]
    #[case("dev-")]
    #[case(".dev")]
    #[case("")]
    fn test_parse_rejects_invalid_names(#[case] selector: &str) {
        let err = parse_environment(selector).unwrap_err();
        assert!(
            err.to_string()
                .contains("must be a valid environment name or <namespace>.<environment>"),
            "{err}"
        );
    }

    #[rstest]
    #[case("dev")]
    #[case("my-env-2")]
    #[case("a")]
    #[case("0")]
    fn test_valid_names(#[case] name: &str) {
        assert!(is_valid_name(name));
    }
}
