//! Project, environment and provider configuration types

use crate::value::Variables;
use crate::{Error, Result};
use orca_fs::NormalizedPath;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default project varfile, relative to the project root.
pub const DEFAULT_PROJECT_VARFILE: &str = "orca.env";

/// Name of the environment synthesized when a project declares none.
pub const DEFAULT_ENVIRONMENT_NAME: &str = "default";

/// Default varfile for an environment, relative to the project root.
pub fn default_environment_varfile(environment: &str) -> String {
    format!("orca.{environment}.env")
}

fn default_project_varfile() -> String {
    DEFAULT_PROJECT_VARFILE.to_string()
}

/// Canonical project configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    pub name: String,

    /// Project root directory; set by the resolver.
    #[serde(default)]
    pub path: NormalizedPath,

    #[serde(default)]
    pub default_environment: String,

    #[serde(default)]
    pub environments: Vec<EnvironmentConfig>,

    #[serde(default)]
    pub providers: Vec<ProviderConfig>,

    #[serde(default)]
    pub variables: Variables,

    #[serde(default = "default_project_varfile")]
    pub varfile: String,

    #[serde(default)]
    pub sources: Vec<SourceConfig>,

    #[serde(default)]
    pub outputs: Vec<OutputSpec>,
}

impl ProjectConfig {
    pub fn environment(&self, name: &str) -> Option<&EnvironmentConfig> {
        self.environments.iter().find(|env| env.name == name)
    }

    pub fn environment_names(&self) -> Vec<&str> {
        self.environments.iter().map(|env| env.name.as_str()).collect()
    }
}

/// Whether an environment may, must, or must not be selected with a namespace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespacing {
    #[default]
    Optional,
    Required,
    Disabled,
}

/// One environment declared by a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentConfig {
    pub name: String,

    #[serde(default)]
    pub namespacing: Namespacing,

    #[serde(default)]
    pub production: bool,

    #[serde(default)]
    pub variables: Variables,

    /// Explicit varfile; when absent `orca.<name>.env` is tried.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub varfile: Option<String>,

    /// Legacy inline provider declarations, moved to the project's provider
    /// list during resolution.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub providers: Vec<ProviderConfig>,
}

impl EnvironmentConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespacing: Namespacing::default(),
            production: false,
            variables: Variables::new(),
            varfile: None,
            providers: Vec::new(),
        }
    }

    /// The varfile path for this environment and whether it was set explicitly.
    pub fn varfile_path(&self) -> (String, bool) {
        match &self.varfile {
            Some(path) => (path.clone(), true),
            None => (default_environment_varfile(&self.name), false),
        }
    }
}

/// A provider declaration fragment.
///
/// Settings other than `name` and `environments` are opaque here and are
/// validated by the owning plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub name: String,

    /// Environments this fragment applies to; `None` means all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environments: Option<Vec<String>>,

    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

impl ProviderConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            environments: None,
            settings: Map::new(),
        }
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: Value) -> Self {
        self.settings.insert(key.into(), value);
        self
    }

    pub fn with_environments<I, S>(mut self, environments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.environments = Some(environments.into_iter().map(Into::into).collect());
        self
    }

    /// Whether this fragment applies to `environment`.
    pub fn applies_to(&self, environment: &str) -> bool {
        self.environments
            .as_ref()
            .is_none_or(|envs| envs.iter().any(|e| e == environment))
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| Error::configuration(format!("Invalid provider configuration: {e}")))
    }
}

/// Reference to an external source repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceConfig {
    pub name: String,
    pub repository_url: String,
}

/// A declared project output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSpec {
    pub name: String,
    pub value: Value,
}
