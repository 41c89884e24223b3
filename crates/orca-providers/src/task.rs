//! Provider resolution task
//!
//! One task per configured provider. A task exposes the contract a task
//! scheduler expects:
//!
//! - [`name`](ResolveProviderTask::name) is the task's stable identity.
//! - [`resolve_dependencies`](ResolveProviderTask::resolve_dependencies)
//!   returns the tasks that must complete first.
//! - [`process`](ResolveProviderTask::process) receives their results and
//!   produces the [`Provider`].
//!
//! Processing goes through the run's memo, so a provider is configured and
//! checked at most once per run however many tasks ask for it.

use crate::context::ResolutionContext;
use crate::plugin::{
    ConfigureProviderParams, EnvironmentStatusParams, Plugin, PrepareEnvironmentParams,
};
use crate::provider::Provider;
use crate::{Error, Result};
use orca_config::{ConfigSchema, ProviderConfig, referenced_providers};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub struct ResolveProviderTask {
    config: ProviderConfig,
    plugin: Arc<dyn Plugin>,
    context: Arc<ResolutionContext>,
}

impl ResolveProviderTask {
    /// Create the task for `config`, failing if no plugin backs it.
    pub fn new(config: ProviderConfig, context: Arc<ResolutionContext>) -> Result<Self> {
        let plugin = context.registry.require(&config.name)?.clone();
        Ok(Self {
            config,
            plugin,
            context,
        })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn context(&self) -> &Arc<ResolutionContext> {
        &self.context
    }

    /// Tasks for every configured provider this one depends on.
    ///
    /// Explicit dependencies come from the plugin and must match at least
    /// one configured provider. Implicit dependencies are the providers
    /// referenced by templates in the raw config; unmatched ones are skipped
    /// and surface later as template errors.
    pub fn resolve_dependencies(&self) -> Result<Vec<ResolveProviderTask>> {
        let (matched, unmatched) = self.dependency_configs()?;
        for dependency in &unmatched {
            tracing::warn!(
                provider = %self.name(),
                dependency = %dependency,
                "Template references a provider that is not configured"
            );
        }

        tracing::debug!(
            provider = %self.name(),
            dependencies = ?matched.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            "Resolved provider dependencies"
        );

        matched
            .into_iter()
            .map(|config| Self::new(config.clone(), self.context.clone()))
            .collect()
    }

    /// Configured providers this one depends on, explicit ones first, in
    /// discovery order, plus the template references nothing matched.
    fn dependency_configs(&self) -> Result<(Vec<&ProviderConfig>, Vec<String>)> {
        let explicit = self.plugin.dependencies();
        let implicit: Vec<String> = referenced_providers(&self.config.to_value())
            .into_iter()
            .filter(|name| !explicit.contains(name))
            .collect();

        let mut matched: Vec<&ProviderConfig> = Vec::new();
        let mut unmatched = Vec::new();

        for dependency in &explicit {
            let candidates = self.candidates(dependency);
            if candidates.is_empty() {
                return Err(Error::configuration(format!(
                    "Missing provider dependency '{dependency}' in configuration. Provider '{}' requires it.",
                    self.name()
                )));
            }
            push_unique(&mut matched, candidates);
        }

        for dependency in implicit {
            let candidates = self.candidates(&dependency);
            if candidates.is_empty() {
                unmatched.push(dependency);
                continue;
            }
            push_unique(&mut matched, candidates);
        }

        Ok((matched, unmatched))
    }

    fn candidates(&self, dependency: &str) -> Vec<&ProviderConfig> {
        self.context
            .providers_matching(dependency)
            .into_iter()
            .filter(|config| config.name != self.config.name)
            .collect()
    }

    /// `dependencies` as a list, in the order they were discovered.
    fn in_discovery_order(
        &self,
        mut dependencies: BTreeMap<String, Arc<Provider>>,
    ) -> Vec<Arc<Provider>> {
        let order: Vec<String> = self
            .dependency_configs()
            .map(|(configs, _)| configs.into_iter().map(|c| c.name.clone()).collect())
            .unwrap_or_default();

        let mut ordered: Vec<Arc<Provider>> = order
            .iter()
            .filter_map(|name| dependencies.remove(name))
            .collect();
        ordered.extend(dependencies.into_values());
        ordered
    }

    /// Resolve this provider given its resolved dependencies, keyed by name.
    ///
    /// Returns the memoized provider when one exists for this run.
    pub async fn process(
        &self,
        dependencies: BTreeMap<String, Arc<Provider>>,
    ) -> Result<Arc<Provider>> {
        self.context
            .memo
            .get_or_resolve(self.name(), || self.resolve(dependencies))
            .await
    }

    fn schema(&self) -> ConfigSchema {
        match self.plugin.config_schema() {
            Some(schema) => schema.clone().extend(&ConfigSchema::provider()),
            None => ConfigSchema::provider().allow_unknown(true),
        }
    }

    async fn resolve(&self, dependencies: BTreeMap<String, Arc<Provider>>) -> Result<Provider> {
        let name = self.name();
        let environment = &self.context.environment;
        tracing::debug!(provider = %name, environment = %environment.full_name, "Resolving provider");

        let templates = self.context.template_context(&dependencies);
        let resolved = templates.resolve_value(&self.config.to_value())?;

        let schema = self.schema();
        let label = format!("provider configuration ({name})");
        let validated = schema.validate(&resolved, &label, false)?;

        let configured = self
            .plugin
            .configure_provider(ConfigureProviderParams {
                config: &validated,
                environment_name: &environment.name,
                namespace: environment.namespace.as_deref(),
                dependencies: &dependencies,
                project_name: &self.context.project_name,
                project_root: &self.context.project_root,
            })
            .await?;

        let mut config = schema.validate(&configured.config, &label, false)?;
        for base in self.context.registry.ancestors(name) {
            if let Some(base_schema) = base.config_schema() {
                let label = format!(
                    "provider configuration (base schema from '{}' plugin)",
                    base.name()
                );
                config = base_schema.validate(&config, &label, true)?;
            }
        }

        let mut status = self
            .plugin
            .get_environment_status(EnvironmentStatusParams {
                provider_name: name,
                config: &config,
                environment_name: &environment.name,
                namespace: environment.namespace.as_deref(),
            })
            .await?;

        if !status.ready || self.context.force_init {
            tracing::info!(
                provider = %name,
                ready = status.ready,
                force = self.context.force_init,
                "Preparing environment"
            );
            status = self
                .plugin
                .prepare_environment(PrepareEnvironmentParams {
                    provider_name: name,
                    config: &config,
                    environment_name: &environment.name,
                    namespace: environment.namespace.as_deref(),
                    status: &status,
                    force: self.context.force_init,
                })
                .await?
                .status;
        }

        if !status.ready {
            let detail = serde_json::to_string(&status).unwrap_or_else(|_| Value::Null.to_string());
            return Err(Error::plugin(
                name,
                format!(
                    "Provider {name} reported status as not ready and could not be prepared. Status: {detail}"
                ),
            ));
        }

        tracing::info!(provider = %name, "Provider ready");

        Ok(Provider {
            name: name.to_string(),
            config,
            dependencies: self.in_discovery_order(dependencies),
            module_configs: configured.module_configs,
            status,
        })
    }
}

fn push_unique<'a>(matched: &mut Vec<&'a ProviderConfig>, candidates: Vec<&'a ProviderConfig>) {
    for candidate in candidates {
        if !matched.iter().any(|m| m.name == candidate.name) {
            matched.push(candidate);
        }
    }
}

impl fmt::Debug for ResolveProviderTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolveProviderTask")
            .field("name", &self.config.name)
            .field("plugin", &self.plugin.name())
            .field("environment", &self.context.environment.full_name)
            .finish()
    }
}
