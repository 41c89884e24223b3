//! Shared state for one resolution run

use crate::memo::ResolutionMemo;
use crate::provider::Provider;
use crate::registry::PluginRegistry;
use orca_config::{LocalContext, ProjectConfig, ProviderConfig, ResolvedEnvironment, TemplateContext};
use orca_fs::NormalizedPath;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Everything a provider resolution task reads.
///
/// The memo is the only mutable part and is shared between tasks of the
/// same run.
#[derive(Debug)]
pub struct ResolutionContext {
    pub project_name: String,
    pub project_root: NormalizedPath,
    pub environment: ResolvedEnvironment,
    pub registry: Arc<PluginRegistry>,
    pub secrets: Map<String, Value>,
    pub local: LocalContext,
    /// Ask every plugin to prepare its environment even when ready.
    pub force_init: bool,
    pub memo: Arc<ResolutionMemo>,
}

impl ResolutionContext {
    pub fn new(
        project: &ProjectConfig,
        environment: ResolvedEnvironment,
        registry: Arc<PluginRegistry>,
    ) -> Self {
        Self {
            project_name: project.name.clone(),
            project_root: project.path.clone(),
            environment,
            registry,
            secrets: Map::new(),
            local: LocalContext::default(),
            force_init: false,
            memo: Arc::new(ResolutionMemo::new()),
        }
    }

    pub fn with_secrets(mut self, secrets: Map<String, Value>) -> Self {
        self.secrets = secrets;
        self
    }

    pub fn with_local(mut self, local: LocalContext) -> Self {
        self.local = local;
        self
    }

    pub fn with_force_init(mut self, force_init: bool) -> Self {
        self.force_init = force_init;
        self
    }

    /// Share an existing memo, e.g. across several resolvers of one run.
    pub fn with_memo(mut self, memo: Arc<ResolutionMemo>) -> Self {
        self.memo = memo;
        self
    }

    pub fn configured_provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.environment.providers.iter().find(|p| p.name == name)
    }

    /// Configured providers named `dependency` or built on a plugin of that
    /// name, in declaration order.
    pub fn providers_matching(&self, dependency: &str) -> Vec<&ProviderConfig> {
        self.environment
            .providers
            .iter()
            .filter(|p| self.registry.is_a(&p.name, dependency))
            .collect()
    }

    /// Template context for a provider whose dependencies are `dependencies`.
    pub fn template_context(&self, dependencies: &BTreeMap<String, Arc<Provider>>) -> TemplateContext {
        let providers: Map<String, Value> = dependencies
            .iter()
            .map(|(name, provider)| (name.clone(), provider.template_value()))
            .collect();
        let variables = Value::Object(self.environment.variables.clone());

        TemplateContext::for_project(&self.project_name, &self.project_root, &self.local)
            .with(
                "environment",
                json!({
                    "name": self.environment.name,
                    "namespace": self.environment.namespace,
                    "fullName": self.environment.full_name,
                    "production": self.environment.production,
                }),
            )
            .with("var", variables.clone())
            .with("variables", variables)
            .with("secrets", Value::Object(self.secrets.clone()))
            .with("providers", Value::Object(providers))
    }
}
