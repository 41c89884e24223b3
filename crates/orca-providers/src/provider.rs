//! Resolved provider records

use crate::plugin::EnvironmentStatus;
use serde_json::{Value, json};
use std::sync::Arc;

/// A fully resolved provider.
///
/// Created only once its dependency subtree is resolved and its environment
/// reports ready. Never modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Provider {
    pub name: String,
    pub config: Value,
    pub dependencies: Vec<Arc<Provider>>,
    pub module_configs: Vec<Value>,
    pub status: EnvironmentStatus,
}

impl Provider {
    pub fn dependency_names(&self) -> Vec<&str> {
        self.dependencies.iter().map(|d| d.name.as_str()).collect()
    }

    /// The view of this provider exposed to dependents' templates.
    pub fn template_value(&self) -> Value {
        json!({
            "config": self.config,
            "outputs": self.status.outputs,
        })
    }

    /// Short JSON summary for display.
    pub fn summary(&self) -> Value {
        json!({
            "name": self.name,
            "ready": self.status.ready,
            "dependencies": self.dependency_names(),
            "outputs": self.status.outputs,
            "dashboardPages": self.status.dashboard_pages,
        })
    }
}
