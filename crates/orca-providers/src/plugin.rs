//! Plugin trait and handler types

use crate::Result;
use crate::provider::Provider;
use async_trait::async_trait;
use orca_config::ConfigSchema;
use orca_fs::NormalizedPath;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A link shown to users for an activated environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardPage {
    pub title: String,
    pub url: String,
}

/// Readiness of a provider's environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentStatus {
    pub ready: bool,
    /// Plugin-specific payload, opaque to the resolver.
    pub detail: Value,
    /// Exposed to templates as `providers.<name>.outputs`.
    pub outputs: Map<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dashboard_pages: Vec<DashboardPage>,
}

impl EnvironmentStatus {
    pub fn ready() -> Self {
        Self {
            ready: true,
            ..Self::default()
        }
    }

    pub fn not_ready(detail: Value) -> Self {
        Self {
            ready: false,
            detail,
            ..Self::default()
        }
    }

    pub fn with_outputs(mut self, outputs: Map<String, Value>) -> Self {
        self.outputs = outputs;
        self
    }

    pub fn with_output(mut self, key: impl Into<String>, value: Value) -> Self {
        self.outputs.insert(key.into(), value);
        self
    }

    pub fn with_dashboard_page(mut self, title: impl Into<String>, url: impl Into<String>) -> Self {
        self.dashboard_pages.push(DashboardPage {
            title: title.into(),
            url: url.into(),
        });
        self
    }
}

/// Input to [`Plugin::configure_provider`].
#[derive(Debug)]
pub struct ConfigureProviderParams<'a> {
    pub config: &'a Value,
    pub environment_name: &'a str,
    pub namespace: Option<&'a str>,
    pub dependencies: &'a BTreeMap<String, Arc<Provider>>,
    pub project_name: &'a str,
    pub project_root: &'a NormalizedPath,
}

/// Output of [`Plugin::configure_provider`].
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigureProviderResult {
    pub config: Value,
    /// Extra module configs contributed by the plugin; opaque here.
    pub module_configs: Vec<Value>,
}

impl ConfigureProviderResult {
    pub fn new(config: Value) -> Self {
        Self {
            config,
            module_configs: Vec::new(),
        }
    }
}

/// Input to [`Plugin::get_environment_status`].
#[derive(Debug)]
pub struct EnvironmentStatusParams<'a> {
    pub provider_name: &'a str,
    pub config: &'a Value,
    pub environment_name: &'a str,
    pub namespace: Option<&'a str>,
}

/// Input to [`Plugin::prepare_environment`].
#[derive(Debug)]
pub struct PrepareEnvironmentParams<'a> {
    pub provider_name: &'a str,
    pub config: &'a Value,
    pub environment_name: &'a str,
    pub namespace: Option<&'a str>,
    pub status: &'a EnvironmentStatus,
    /// Set when the caller asked for re-initialization.
    pub force: bool,
}

/// Output of [`Plugin::prepare_environment`].
#[derive(Debug, Clone, PartialEq)]
pub struct PrepareEnvironmentResult {
    pub status: EnvironmentStatus,
}

/// A plugin backing one provider name.
///
/// Every handler has a default: configuration passes through unchanged,
/// the environment reports ready, and preparation keeps the given status.
#[async_trait]
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    /// Name of the plugin this one extends.
    fn base(&self) -> Option<&str> {
        None
    }

    /// Provider names (or base plugin names) this plugin requires.
    fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }

    /// Schema for this plugin's provider config.
    fn config_schema(&self) -> Option<&ConfigSchema> {
        None
    }

    async fn configure_provider(
        &self,
        params: ConfigureProviderParams<'_>,
    ) -> Result<ConfigureProviderResult> {
        Ok(ConfigureProviderResult::new(params.config.clone()))
    }

    async fn get_environment_status(
        &self,
        _params: EnvironmentStatusParams<'_>,
    ) -> Result<EnvironmentStatus> {
        Ok(EnvironmentStatus::ready())
    }

    async fn prepare_environment(
        &self,
        params: PrepareEnvironmentParams<'_>,
    ) -> Result<PrepareEnvironmentResult> {
        Ok(PrepareEnvironmentResult {
            status: params.status.clone(),
        })
    }
}
