#![allow(dead_code)]

use async_trait::async_trait;
use orca_config::{ConfigSchema, LocalContext, ProjectConfig, pick_environment, resolve_project_config};
use orca_fs::NormalizedPath;
use orca_providers::{
    ConfigureProviderParams, ConfigureProviderResult, EnvironmentStatus, EnvironmentStatusParams,
    Error, Plugin, PluginRegistry, PrepareEnvironmentParams, PrepareEnvironmentResult,
    ProviderResolver, ResolutionContext, Result,
};
use serde_json::{Map, Value, json};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Handler invocation counters shared between a mock and its test.
#[derive(Debug, Default)]
pub struct Calls {
    pub configure: AtomicUsize,
    pub status: AtomicUsize,
    pub prepare: AtomicUsize,
    pub last_force: AtomicBool,
    pub seen_dependencies: Mutex<Vec<String>>,
}

impl Calls {
    pub fn configure(&self) -> usize {
        self.configure.load(Ordering::SeqCst)
    }

    pub fn prepare(&self) -> usize {
        self.prepare.load(Ordering::SeqCst)
    }

    pub fn status(&self) -> usize {
        self.status.load(Ordering::SeqCst)
    }
}

pub struct MockPlugin {
    name: String,
    base: Option<String>,
    dependencies: Vec<String>,
    schema: Option<ConfigSchema>,
    ready: bool,
    prepare_fixes: bool,
    outputs: Map<String, Value>,
    configure_delay: Duration,
    configure_failures: AtomicUsize,
    pub calls: Arc<Calls>,
}

impl MockPlugin {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            base: None,
            dependencies: Vec::new(),
            schema: None,
            ready: true,
            prepare_fixes: true,
            outputs: Map::new(),
            configure_delay: Duration::ZERO,
            configure_failures: AtomicUsize::new(0),
            calls: Arc::new(Calls::default()),
        }
    }

    pub fn base(mut self, base: &str) -> Self {
        self.base = Some(base.to_string());
        self
    }

    pub fn depends_on(mut self, dependency: &str) -> Self {
        self.dependencies.push(dependency.to_string());
        self
    }

    pub fn schema(mut self, schema: ConfigSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Report not ready until prepared; `prepare_fixes` decides whether
    /// preparing helps.
    pub fn not_ready(mut self, prepare_fixes: bool) -> Self {
        self.ready = false;
        self.prepare_fixes = prepare_fixes;
        self
    }

    pub fn output(mut self, key: &str, value: Value) -> Self {
        self.outputs.insert(key.to_string(), value);
        self
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.configure_delay = delay;
        self
    }

    /// Fail the first `times` configure calls.
    pub fn failing(self, times: usize) -> Self {
        self.configure_failures.store(times, Ordering::SeqCst);
        self
    }

    pub fn calls(&self) -> Arc<Calls> {
        self.calls.clone()
    }

    pub fn boxed(self) -> (Arc<dyn Plugin>, Arc<Calls>) {
        let calls = self.calls();
        (Arc::new(self), calls)
    }

    fn status(&self, ready: bool) -> EnvironmentStatus {
        if ready {
            EnvironmentStatus::ready().with_outputs(self.outputs.clone())
        } else {
            EnvironmentStatus::not_ready(json!({"reason": format!("{} is not set up", self.name)}))
        }
    }
}

#[async_trait]
impl Plugin for MockPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    fn dependencies(&self) -> Vec<String> {
        self.dependencies.clone()
    }

    fn config_schema(&self) -> Option<&ConfigSchema> {
        self.schema.as_ref()
    }

    async fn configure_provider(
        &self,
        params: ConfigureProviderParams<'_>,
    ) -> Result<ConfigureProviderResult> {
        self.calls.configure.fetch_add(1, Ordering::SeqCst);
        *self.calls.seen_dependencies.lock().unwrap() =
            params.dependencies.keys().cloned().collect();

        if !self.configure_delay.is_zero() {
            tokio::time::sleep(self.configure_delay).await;
        }

        let remaining = self.configure_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.configure_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(Error::plugin(&self.name, format!("{} failed to configure", self.name)));
        }

        Ok(ConfigureProviderResult {
            config: params.config.clone(),
            module_configs: vec![json!({"kind": "Module", "provider": self.name})],
        })
    }

    async fn get_environment_status(
        &self,
        _params: EnvironmentStatusParams<'_>,
    ) -> Result<EnvironmentStatus> {
        self.calls.status.fetch_add(1, Ordering::SeqCst);
        Ok(self.status(self.ready))
    }

    async fn prepare_environment(
        &self,
        params: PrepareEnvironmentParams<'_>,
    ) -> Result<PrepareEnvironmentResult> {
        self.calls.prepare.fetch_add(1, Ordering::SeqCst);
        self.calls.last_force.store(params.force, Ordering::SeqCst);
        let status = if self.prepare_fixes {
            self.status(true)
        } else {
            params.status.clone()
        };
        Ok(PrepareEnvironmentResult { status })
    }
}

pub fn project(raw: Value) -> ProjectConfig {
    resolve_project_config(
        &raw,
        &NormalizedPath::new("/nonexistent/orca-project"),
        &LocalContext::default(),
    )
    .unwrap()
}

pub fn context(raw: Value, selector: &str, plugins: Vec<Arc<dyn Plugin>>) -> ResolutionContext {
    let project = project(raw);
    let environment = pick_environment(&project, selector).unwrap();
    let registry = PluginRegistry::with_builtins(plugins).unwrap();
    ResolutionContext::new(&project, environment, Arc::new(registry))
}

pub fn resolver(raw: Value, selector: &str, plugins: Vec<Arc<dyn Plugin>>) -> ProviderResolver {
    ProviderResolver::new(context(raw, selector, plugins))
}
