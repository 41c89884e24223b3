//! In-process task driver
//!
//! Runs [`ResolveProviderTask`] trees on tokio. Dependency branches run
//! concurrently; a task is processed only after all of its dependencies
//! have resolved. Cycles are detected along the path from the root.

use crate::context::ResolutionContext;
use crate::provider::Provider;
use crate::task::ResolveProviderTask;
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::task::JoinSet;

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

#[derive(Debug, Clone)]
pub struct ProviderResolver {
    context: Arc<ResolutionContext>,
}

impl ProviderResolver {
    pub fn new(context: ResolutionContext) -> Self {
        Self {
            context: Arc::new(context),
        }
    }

    pub fn context(&self) -> &Arc<ResolutionContext> {
        &self.context
    }

    /// One task per provider of the environment, in declaration order.
    pub fn root_tasks(&self) -> Result<Vec<ResolveProviderTask>> {
        self.context
            .environment
            .providers
            .iter()
            .map(|config| ResolveProviderTask::new(config.clone(), self.context.clone()))
            .collect()
    }

    /// Resolve every provider of the environment.
    ///
    /// Results are returned in declaration order. The first failure aborts
    /// the remaining work and is returned unchanged.
    pub async fn resolve_all(&self) -> Result<Vec<Arc<Provider>>> {
        let tasks = self.root_tasks()?;
        tracing::debug!(
            environment = %self.context.environment.full_name,
            providers = tasks.len(),
            "Resolving providers"
        );

        let mut slots: Vec<Option<Arc<Provider>>> = vec![None; tasks.len()];
        let mut set = JoinSet::new();
        for (index, task) in tasks.into_iter().enumerate() {
            set.spawn(async move { (index, run_task(task, Vec::new()).await) });
        }

        while let Some(joined) = set.join_next().await {
            let (index, result) = joined.map_err(|e| Error::Join {
                provider: self.context.environment.full_name.clone(),
                message: e.to_string(),
            })?;
            slots[index] = Some(result?);
        }

        Ok(slots.into_iter().flatten().collect())
    }

    /// Resolve a single configured provider and its dependencies.
    pub async fn resolve(&self, name: &str) -> Result<Arc<Provider>> {
        let Some(config) = self.context.configured_provider(name) else {
            return Err(orca_config::Error::parameter(format!(
                "Provider '{name}' is not configured for environment {}. Configured providers: {}",
                self.context.environment.full_name,
                self.context
                    .environment
                    .providers
                    .iter()
                    .map(|p| p.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
            .into());
        };

        let task = ResolveProviderTask::new(config.clone(), self.context.clone())?;
        run_task(task, Vec::new()).await
    }
}

fn run_task(task: ResolveProviderTask, path: Vec<String>) -> BoxFuture<Result<Arc<Provider>>> {
    Box::pin(async move {
        let name = task.name().to_string();

        if let Some(provider) = task.context().memo.get(&name) {
            return Ok(provider);
        }

        if let Some(start) = path.iter().position(|p| *p == name) {
            let mut cycle: Vec<&str> = path[start..].iter().map(String::as_str).collect();
            cycle.push(&name);
            return Err(Error::configuration(format!(
                "Circular dependency detected between providers: {}",
                cycle.join(" <- ")
            )));
        }

        let dependencies = task.resolve_dependencies()?;
        let mut path = path;
        path.push(name.clone());

        let mut set = JoinSet::new();
        for dependency in dependencies {
            set.spawn(run_task(dependency, path.clone()));
        }

        let mut results = BTreeMap::new();
        while let Some(joined) = set.join_next().await {
            let provider = joined.map_err(|e| Error::Join {
                provider: name.clone(),
                message: e.to_string(),
            })??;
            results.insert(provider.name.clone(), provider);
        }

        task.process(results).await
    })
}
